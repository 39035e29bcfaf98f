use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Monotonic id of one submission attempt. Minted by the caller and echoed
/// on every event so stale completions can be told apart from live ones.
pub type SubmissionId = u64;

/// Task phase as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemotePhase {
    Uploaded,
    Queued,
    Processing,
    Complete,
    Failed,
}

impl RemotePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RemotePhase::Complete | RemotePhase::Failed)
    }
}

/// One per-file failure as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FailedFile {
    pub file_name: String,
    pub message: String,
}

/// Decoded body of the status endpoint. Absent fields default so the client
/// tolerates sparse reports from older service builds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusReport {
    #[serde(rename = "status")]
    pub phase: RemotePhase,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub total_files: u32,
    #[serde(default)]
    pub processed_files: u32,
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub successful_files: Vec<String>,
    #[serde(default)]
    pub failed_files: Vec<FailedFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ConvertRequest<'a> {
    pub task_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
}

/// Structured error body of the service (`{"detail": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}

/// Error from one request against the conversion service. The message is
/// user-facing: the remote-supplied detail when the error body decoded,
/// otherwise the transport's status text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Network,
    Timeout,
    HttpStatus(u16),
    Decode,
    Io,
}

/// Which request of the submission pipeline an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Upload,
    Convert,
    Poll,
    Download,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStage::Upload => write!(f, "upload"),
            RequestStage::Convert => write!(f, "convert"),
            RequestStage::Poll => write!(f, "poll"),
            RequestStage::Download => write!(f, "download"),
        }
    }
}

/// Engine → UI events, all tagged with the submission they belong to.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadAccepted {
        submission: SubmissionId,
        task_id: String,
    },
    ConvertAccepted {
        submission: SubmissionId,
    },
    StatusReported {
        submission: SubmissionId,
        report: StatusReport,
    },
    /// A pipeline request failed; the pipeline for this submission is over.
    SubmissionFailed {
        submission: SubmissionId,
        stage: RequestStage,
        message: String,
    },
    DownloadFinished {
        submission: SubmissionId,
        path: PathBuf,
    },
    DownloadFailed {
        submission: SubmissionId,
        message: String,
    },
}
