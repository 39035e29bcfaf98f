use std::path::PathBuf;

use crate::{AppState, DownloadState, DropStats, TaskPhase};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub file_list: FileListView,
    pub status: StatusView,
    pub fps: FpsFieldView,
    pub alert: Option<String>,
    pub last_drop: Option<DropStats>,
}

/// Rendered file list plus the availability of the submit/clear controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileListView {
    pub rows: Vec<FileRowView>,
    /// Show the "no files selected" placeholder instead of rows.
    pub placeholder: bool,
    pub submit_enabled: bool,
    pub clear_visible: bool,
}

/// One file row; `index` is the removal handle and is re-derived on every
/// render, so it can never go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FpsFieldView {
    pub enabled: bool,
    pub value: String,
}

/// Rendered task status: phase text, progress percentage, per-file failures
/// and the download affordance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusView {
    pub message: String,
    /// Percentage in `[0,100]`, present only while the service reports a
    /// progress fraction inside `[0,1]`.
    pub progress_percent: Option<f32>,
    pub failures: Vec<String>,
    pub download: DownloadView,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DownloadView {
    /// No terminal result yet.
    #[default]
    Hidden,
    /// The archive can be fetched for this task.
    Available { task_id: String },
    /// Terminal outcome with zero successes.
    NothingToDownload,
    InFlight,
    Saved { path: PathBuf },
    Failed { message: String },
}

impl AppState {
    /// Builds the render contract for the whole window. Pure; must be called
    /// after every state change since no view holds state of its own.
    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            file_list: build_file_list(self),
            status: build_status(self),
            fps: FpsFieldView {
                enabled: self.custom_fps_enabled(),
                value: self.fps_input().to_string(),
            },
            alert: self.alert().map(ToOwned::to_owned),
            last_drop: self.last_drop(),
        }
    }
}

fn build_file_list(state: &AppState) -> FileListView {
    let rows = state
        .files()
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| FileRowView {
            index,
            label: format!("{} ({})", entry.name, format_file_size(entry.size_bytes)),
        })
        .collect();
    let empty = state.files().is_empty();
    FileListView {
        rows,
        placeholder: empty,
        submit_enabled: !empty && !state.task().phase().is_busy(),
        clear_visible: !empty,
    }
}

fn build_status(state: &AppState) -> StatusView {
    let task = state.task();
    let fps_suffix = task
        .fps
        .map(|fps| format!(" (FPS: {fps})"))
        .unwrap_or_default();

    let message = match task.phase {
        TaskPhase::Idle => "Waiting to start...".to_string(),
        TaskPhase::Uploading => "Uploading files...".to_string(),
        TaskPhase::Uploaded => format!("Upload complete, requesting conversion...{fps_suffix}"),
        TaskPhase::Queued => format!("Task queued, waiting to be processed...{fps_suffix}"),
        TaskPhase::Processing => format!(
            "Processing: {} / {} files...{}",
            task.processed_files, task.total_files, fps_suffix
        ),
        TaskPhase::Complete => format!(
            "Conversion finished! {} file(s) succeeded.{}",
            task.successful_files.len(),
            fps_suffix
        ),
        TaskPhase::Failed => format!(
            "Task finished. Succeeded: {}, failed: {}.{}",
            task.successful_files.len(),
            task.failed_files.len(),
            fps_suffix
        ),
        TaskPhase::Error => match &task.error {
            Some((stage, message)) => format!("{stage} failed: {message}"),
            None => "Request failed.".to_string(),
        },
    };

    let progress_percent = task
        .progress
        .filter(|fraction| (0.0..=1.0).contains(fraction))
        .map(|fraction| fraction * 100.0);

    let failures = task
        .failed_files
        .iter()
        .map(|failure| format!("{}: {}", failure.file_name, failure.message))
        .collect();

    let download = match task.phase {
        TaskPhase::Complete | TaskPhase::Failed => match (&task.download, task.task_id()) {
            (Some(DownloadState::InFlight), _) => DownloadView::InFlight,
            (Some(DownloadState::Saved(path)), _) => DownloadView::Saved { path: path.clone() },
            (Some(DownloadState::Failed(message)), _) => DownloadView::Failed {
                message: message.clone(),
            },
            (None, Some(task_id)) if !task.successful_files.is_empty() => DownloadView::Available {
                task_id: task_id.to_string(),
            },
            (None, _) => DownloadView::NothingToDownload,
        },
        _ => DownloadView::Hidden,
    };

    StatusView {
        message,
        progress_percent,
        failures,
        download,
    }
}

/// Human-scaled size: plain bytes below 1024, KB with two decimals below
/// 1,048,576, MB with two decimals above.
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes < 1024 {
        format!("{size_bytes} bytes")
    } else if size_bytes < 1024 * 1024 {
        format!("{:.2} KB", size_bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", size_bytes as f64 / (1024.0 * 1024.0))
    }
}
