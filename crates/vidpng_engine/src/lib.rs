//! vidpng engine: conversion-service client, submission pipeline and poller.
mod api;
mod engine;
mod poller;
mod storage;
mod types;

pub use api::{ConversionApi, ReqwestApi, ServiceSettings, UploadFile};
pub use engine::{EngineConfig, EngineHandle};
pub use storage::{ensure_download_dir, AtomicFileWriter, StorageError};
pub use types::{
    ApiError, ApiErrorKind, EngineEvent, FailedFile, RemotePhase, RequestStage, StatusReport,
    SubmissionId,
};
