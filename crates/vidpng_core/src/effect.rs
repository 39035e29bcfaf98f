use std::path::PathBuf;

use crate::SubmissionId;

/// A file handed to the engine for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFile {
    pub name: String,
    pub media_type: String,
    pub path: PathBuf,
}

/// Side effects requested by the update function, executed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Invalidate the previous submission: its poller must stop and its
    /// completions must no longer reach the model.
    CancelSubmission { submission: SubmissionId },
    /// Run the upload → convert → poll pipeline for the given batch.
    BeginSubmission {
        submission: SubmissionId,
        files: Vec<SubmissionFile>,
        fps: Option<u32>,
    },
    /// Fetch the result archive for a finished task.
    BeginDownload {
        submission: SubmissionId,
        task_id: String,
    },
}
