use std::path::PathBuf;

use crate::{FileEntry, RequestStage, StatusReport, SubmissionId};

/// Inputs to the pure update function: user events and engine completions.
///
/// Every engine completion carries the [`SubmissionId`] it belongs to;
/// `update` drops completions whose id no longer matches the live submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Files chosen through the picker (already restricted to the video family).
    FilesPicked(Vec<FileEntry>),
    /// Files dropped onto the window; `rejected` counts discarded non-video items.
    FilesDropped {
        accepted: Vec<FileEntry>,
        rejected: usize,
    },
    /// User clicked the remove control of one file row.
    RemoveFileAt(usize),
    /// User clicked Clear list.
    ClearFiles,
    /// User toggled the custom frame-rate checkbox.
    CustomFpsToggled(bool),
    /// User edited the frame-rate field.
    FpsInputChanged(String),
    /// User clicked Convert.
    SubmitClicked,
    /// User clicked the download affordance.
    DownloadClicked,
    /// User dismissed the validation alert.
    AlertDismissed,
    /// Upload request succeeded; the service issued a task identifier.
    UploadAccepted {
        submission: SubmissionId,
        task_id: String,
    },
    /// Conversion request acknowledged by the service.
    ConvertAccepted { submission: SubmissionId },
    /// One polled status report, already decoded.
    StatusReported {
        submission: SubmissionId,
        report: StatusReport,
    },
    /// A pipeline request failed; no further events follow for this submission.
    SubmissionFailed {
        submission: SubmissionId,
        stage: RequestStage,
        message: String,
    },
    /// Result archive saved to disk.
    DownloadFinished {
        submission: SubmissionId,
        path: PathBuf,
    },
    /// Result archive fetch failed.
    DownloadFailed {
        submission: SubmissionId,
        message: String,
    },
}
