use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesPicked(files) => {
            let effects = state.invalidate_task();
            state.add_files(files);
            effects
        }
        Msg::FilesDropped { accepted, rejected } => {
            state.set_drop_stats(accepted.len(), rejected);
            let effects = state.invalidate_task();
            state.add_files(accepted);
            effects
        }
        Msg::RemoveFileAt(index) => {
            // Out-of-range indices leave everything untouched, including the
            // task model.
            if state.remove_file(index) {
                state.invalidate_task()
            } else {
                Vec::new()
            }
        }
        Msg::ClearFiles => {
            state.clear_files();
            state.invalidate_task()
        }
        Msg::CustomFpsToggled(enabled) => {
            state.set_custom_fps(enabled);
            Vec::new()
        }
        Msg::FpsInputChanged(text) => {
            state.set_fps_input(&text);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::DownloadClicked => download(&mut state),
        Msg::AlertDismissed => {
            state.dismiss_alert();
            Vec::new()
        }
        Msg::UploadAccepted {
            submission,
            task_id,
        } => {
            state.apply_upload_accepted(submission, task_id);
            Vec::new()
        }
        Msg::ConvertAccepted { submission } => {
            state.apply_convert_accepted(submission);
            Vec::new()
        }
        Msg::StatusReported { submission, report } => {
            state.apply_status_report(submission, report);
            Vec::new()
        }
        Msg::SubmissionFailed {
            submission,
            stage,
            message,
        } => {
            state.apply_submission_failed(submission, stage, message);
            Vec::new()
        }
        Msg::DownloadFinished { submission, path } => {
            state.apply_download_finished(submission, path);
            Vec::new()
        }
        Msg::DownloadFailed {
            submission,
            message,
        } => {
            state.apply_download_failed(submission, message);
            Vec::new()
        }
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if state.files().is_empty() {
        state.set_alert("Select at least one video file to convert.");
        return Vec::new();
    }

    let fps = if state.custom_fps_enabled() {
        match parse_positive_fps(state.fps_input()) {
            Some(fps) => Some(fps),
            None => {
                state.set_alert("Enter a positive whole number for the custom frame rate.");
                return Vec::new();
            }
        }
    } else {
        None
    };

    // Replace-and-invalidate: the previous submission's poller is stopped
    // before the new pipeline starts.
    let mut effects = state.invalidate_task();
    let (submission, files) = state.begin_submission();
    effects.push(Effect::BeginSubmission {
        submission,
        files,
        fps,
    });
    effects
}

fn download(state: &mut AppState) -> Vec<Effect> {
    match state.downloadable() {
        Some((submission, task_id)) => {
            state.mark_download_in_flight();
            vec![Effect::BeginDownload {
                submission,
                task_id,
            }]
        }
        None => Vec::new(),
    }
}

/// Accepts exactly the strings denoting a positive integer: non-empty, all
/// digits, no leading zero.
fn parse_positive_fps(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
