use std::fmt;
use std::path::PathBuf;

use crate::{Effect, FileEntry, FileSet, SubmissionFile};

/// Monotonic handle for one submission attempt. Engine completions are
/// tagged with the id they belong to; only the live id may mutate the model.
pub type SubmissionId = u64;

/// Lifecycle stage of the single tracked conversion task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskPhase {
    #[default]
    Idle,
    Uploading,
    Uploaded,
    Queued,
    Processing,
    Complete,
    Failed,
    Error,
}

impl TaskPhase {
    /// Terminal phases accept no further reports for the task.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskPhase::Complete | TaskPhase::Failed | TaskPhase::Error)
    }

    /// A busy phase keeps the submit control disabled.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            TaskPhase::Uploading | TaskPhase::Uploaded | TaskPhase::Queued | TaskPhase::Processing
        )
    }
}

/// Task phase as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

/// One per-file failure reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub file_name: String,
    pub message: String,
}

/// One polled status report, already decoded by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub phase: RemotePhase,
    /// Fraction in `[0,1]`, absent when the service did not report one.
    pub progress: Option<f32>,
    pub total_files: u32,
    pub processed_files: u32,
    /// Effective frame rate, once the service has settled on one.
    pub fps: Option<u32>,
    pub successful_files: Vec<String>,
    pub failed_files: Vec<FailureRecord>,
}

/// Which request of the submission pipeline failed.
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
            RequestStage::Upload => write!(f, "Upload"),
            RequestStage::Convert => write!(f, "Conversion request"),
            RequestStage::Poll => write!(f, "Status poll"),
            RequestStage::Download => write!(f, "Download"),
        }
    }
}

/// Outcome of fetching the result archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadState {
    InFlight,
    Saved(PathBuf),
    Failed(String),
}

/// Single-task status model mirroring the remote job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskModel {
    pub(crate) phase: TaskPhase,
    pub(crate) submission: Option<SubmissionId>,
    pub(crate) task_id: Option<String>,
    pub(crate) fps: Option<u32>,
    pub(crate) progress: Option<f32>,
    pub(crate) total_files: u32,
    pub(crate) processed_files: u32,
    pub(crate) successful_files: Vec<String>,
    pub(crate) failed_files: Vec<FailureRecord>,
    pub(crate) error: Option<(RequestStage, String)>,
    pub(crate) download: Option<DownloadState>,
}

impl TaskModel {
    pub fn phase(&self) -> TaskPhase {
        self.phase
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn successful_files(&self) -> &[String] {
        &self.successful_files
    }

    pub fn failed_files(&self) -> &[FailureRecord] {
        &self.failed_files
    }

    pub fn download(&self) -> Option<&DownloadState> {
        self.download.as_ref()
    }
}

/// Accepted/rejected counts of the most recent drop batch, used to tell the
/// user that non-video items were discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropStats {
    pub accepted: usize,
    pub rejected: usize,
}

/// Whole client state: the pending file set, the frame-rate input, and the
/// status model of the single live task.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    files: FileSet,
    custom_fps: bool,
    fps_input: String,
    task: TaskModel,
    live: Option<SubmissionId>,
    next_submission: SubmissionId,
    alert: Option<String>,
    last_drop: Option<DropStats>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn task(&self) -> &TaskModel {
        &self.task
    }

    pub fn live_submission(&self) -> Option<SubmissionId> {
        self.live
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn last_drop(&self) -> Option<DropStats> {
        self.last_drop
    }

    pub(crate) fn custom_fps_enabled(&self) -> bool {
        self.custom_fps
    }

    pub(crate) fn fps_input(&self) -> &str {
        &self.fps_input
    }

    pub(crate) fn add_files(&mut self, files: Vec<FileEntry>) {
        self.files.append(files);
    }

    pub(crate) fn remove_file(&mut self, index: usize) -> bool {
        self.files.remove_at(index)
    }

    pub(crate) fn clear_files(&mut self) {
        self.files.clear();
    }

    pub(crate) fn set_drop_stats(&mut self, accepted: usize, rejected: usize) {
        self.last_drop = Some(DropStats { accepted, rejected });
    }

    pub(crate) fn set_custom_fps(&mut self, enabled: bool) {
        self.custom_fps = enabled;
        if enabled {
            self.fps_input = "30".to_string();
        }
    }

    /// Stores the frame-rate field with non-digit characters stripped. The
    /// submit path still re-validates: emptiness and zero survive filtering.
    pub(crate) fn set_fps_input(&mut self, text: &str) {
        self.fps_input = text.chars().filter(|c| c.is_ascii_digit()).collect();
    }

    pub(crate) fn set_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub(crate) fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Discards the current task and, when a submission is live, yields the
    /// effect that stops its poller. Every FileSet mutation and every new
    /// submission goes through here, so a stale poll can never resurrect an
    /// abandoned task's state.
    pub(crate) fn invalidate_task(&mut self) -> Vec<Effect> {
        self.task = TaskModel::default();
        match self.live.take() {
            Some(submission) => vec![Effect::CancelSubmission { submission }],
            None => Vec::new(),
        }
    }

    /// Mints the next submission id, marks it live, and snapshots the file
    /// set for the engine. The task model starts over in `Uploading`.
    pub(crate) fn begin_submission(&mut self) -> (SubmissionId, Vec<SubmissionFile>) {
        self.next_submission += 1;
        let submission = self.next_submission;
        self.live = Some(submission);
        self.task = TaskModel {
            phase: TaskPhase::Uploading,
            submission: Some(submission),
            ..TaskModel::default()
        };
        let files = self
            .files
            .entries()
            .iter()
            .map(|entry| SubmissionFile {
                name: entry.name.clone(),
                media_type: entry.media_type.clone(),
                path: entry.path.clone(),
            })
            .collect();
        (submission, files)
    }

    fn is_live(&self, submission: SubmissionId) -> bool {
        self.live == Some(submission)
    }

    pub(crate) fn apply_upload_accepted(&mut self, submission: SubmissionId, task_id: String) {
        if !self.is_live(submission) {
            return;
        }
        self.task.task_id = Some(task_id);
        self.task.phase = TaskPhase::Uploaded;
    }

    pub(crate) fn apply_convert_accepted(&mut self, submission: SubmissionId) {
        if !self.is_live(submission) {
            return;
        }
        self.task.phase = TaskPhase::Queued;
    }

    pub(crate) fn apply_status_report(&mut self, submission: SubmissionId, report: StatusReport) {
        if !self.is_live(submission) {
            return;
        }
        let terminal = report.phase.is_terminal();
        self.task.phase = match report.phase {
            RemotePhase::Uploaded => TaskPhase::Uploaded,
            RemotePhase::Queued => TaskPhase::Queued,
            RemotePhase::Processing => TaskPhase::Processing,
            RemotePhase::Complete => TaskPhase::Complete,
            RemotePhase::Failed => TaskPhase::Failed,
        };
        self.task.progress = report.progress;
        self.task.total_files = report.total_files;
        self.task.processed_files = report.processed_files;
        self.task.fps = report.fps;
        self.task.successful_files = report.successful_files;
        self.task.failed_files = report.failed_files;
        if terminal {
            // The poller stops itself after a terminal report; release the
            // handle so the submit control re-enables.
            self.live = None;
        }
    }

    pub(crate) fn apply_submission_failed(
        &mut self,
        submission: SubmissionId,
        stage: RequestStage,
        message: String,
    ) {
        if !self.is_live(submission) {
            return;
        }
        self.task.phase = TaskPhase::Error;
        self.task.error = Some((stage, message));
        self.live = None;
    }

    /// The task id to download from, when a download is currently offered.
    pub(crate) fn downloadable(&self) -> Option<(SubmissionId, String)> {
        if !matches!(self.task.phase, TaskPhase::Complete | TaskPhase::Failed) {
            return None;
        }
        if self.task.successful_files.is_empty() {
            return None;
        }
        if matches!(self.task.download, Some(DownloadState::InFlight)) {
            return None;
        }
        Some((self.task.submission?, self.task.task_id.clone()?))
    }

    pub(crate) fn mark_download_in_flight(&mut self) {
        self.task.download = Some(DownloadState::InFlight);
    }

    /// Download completions are guarded by the submission the task was
    /// created under, not by liveness: the handle is already released once
    /// the task is terminal.
    pub(crate) fn apply_download_finished(&mut self, submission: SubmissionId, path: PathBuf) {
        if self.task.submission != Some(submission) || !self.task.phase.is_terminal() {
            return;
        }
        self.task.download = Some(DownloadState::Saved(path));
    }

    pub(crate) fn apply_download_failed(&mut self, submission: SubmissionId, message: String) {
        if self.task.submission != Some(submission) || !self.task.phase.is_terminal() {
            return;
        }
        self.task.download = Some(DownloadState::Failed(message));
    }
}
