use std::sync::Once;

use vidpng_core::{
    update, AppState, DownloadView, Effect, FailureRecord, FileEntry, Msg, RemotePhase,
    RequestStage, StatusReport, TaskPhase,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn report(phase: RemotePhase) -> StatusReport {
    StatusReport {
        phase,
        progress: None,
        total_files: 0,
        processed_files: 0,
        fps: None,
        successful_files: Vec::new(),
        failed_files: Vec::new(),
    }
}

/// State with one live submission ("t1") that has passed upload and convert.
fn queued_task(names: &[&str]) -> AppState {
    let files = names
        .iter()
        .map(|name| FileEntry::new(*name, 2_097_152, "video/mp4", format!("/videos/{name}")))
        .collect();
    let (state, _) = update(AppState::new(), Msg::FilesPicked(files));
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = update(
        state,
        Msg::UploadAccepted {
            submission: 1,
            task_id: "t1".to_string(),
        },
    );
    let (state, _) = update(state, Msg::ConvertAccepted { submission: 1 });
    state
}

#[test]
fn single_file_happy_path_ends_with_a_download_link() {
    init_logging();
    let state = queued_task(&["A.mp4"]);

    // 2,097,152 bytes renders as 2.00 MB.
    assert_eq!(state.view().file_list.rows[0].label, "A.mp4 (2.00 MB)");

    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Processing,
                processed_files: 0,
                total_files: 1,
                ..report(RemotePhase::Processing)
            },
        },
    );
    assert_eq!(state.task().phase(), TaskPhase::Processing);
    assert!(state.view().status.message.contains("0 / 1"));
    assert!(!state.view().file_list.submit_enabled);

    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Complete,
                successful_files: vec!["A.mp4".to_string()],
                ..report(RemotePhase::Complete)
            },
        },
    );

    assert_eq!(state.task().phase(), TaskPhase::Complete);
    // Terminal report releases the handle: polling is over, submit re-enables.
    assert_eq!(state.live_submission(), None);

    let view = state.view();
    assert!(view.status.message.contains("1 file(s) succeeded"));
    assert!(view.file_list.submit_enabled);
    assert_eq!(
        view.status.download,
        DownloadView::Available {
            task_id: "t1".to_string()
        }
    );
}

#[test]
fn partial_failure_enumerates_failures_and_still_offers_download() {
    init_logging();
    let state = queued_task(&["A.mp4", "B.mp4"]);

    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Failed,
                successful_files: vec!["A.mp4".to_string()],
                failed_files: vec![FailureRecord {
                    file_name: "B.mp4".to_string(),
                    message: "decode error".to_string(),
                }],
                ..report(RemotePhase::Failed)
            },
        },
    );

    let view = state.view();
    assert!(view.status.message.contains("Succeeded: 1, failed: 1"));
    assert_eq!(view.status.failures, vec!["B.mp4: decode error".to_string()]);
    assert_eq!(
        view.status.download,
        DownloadView::Available {
            task_id: "t1".to_string()
        }
    );
}

#[test]
fn terminal_report_with_zero_successes_offers_nothing() {
    init_logging();
    let state = queued_task(&["A.mp4"]);

    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Complete,
                ..report(RemotePhase::Complete)
            },
        },
    );

    assert_eq!(state.view().status.download, DownloadView::NothingToDownload);

    // With no successes there is nothing to fetch either.
    let (_state, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());
}

#[test]
fn progress_fraction_renders_as_percentage() {
    init_logging();
    let state = queued_task(&["A.mp4", "B.mp4"]);

    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Processing,
                progress: Some(0.5),
                processed_files: 1,
                total_files: 2,
                ..report(RemotePhase::Processing)
            },
        },
    );
    assert_eq!(state.view().status.progress_percent, Some(50.0));

    // Absent fraction hides the indicator.
    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Processing,
                ..report(RemotePhase::Processing)
            },
        },
    );
    assert_eq!(state.view().status.progress_percent, None);
}

#[test]
fn out_of_range_fraction_hides_the_indicator() {
    init_logging();
    let state = queued_task(&["A.mp4"]);

    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Processing,
                progress: Some(1.5),
                ..report(RemotePhase::Processing)
            },
        },
    );
    assert_eq!(state.view().status.progress_percent, None);
}

#[test]
fn effective_fps_is_echoed_in_the_message() {
    init_logging();
    let state = queued_task(&["A.mp4"]);

    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Queued,
                fps: Some(15),
                ..report(RemotePhase::Queued)
            },
        },
    );
    assert!(state.view().status.message.contains("(FPS: 15)"));
}

#[test]
fn reports_after_terminal_are_dropped() {
    init_logging();
    let state = queued_task(&["A.mp4"]);
    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Complete,
                successful_files: vec!["A.mp4".to_string()],
                ..report(RemotePhase::Complete)
            },
        },
    );
    assert_eq!(state.task().phase(), TaskPhase::Complete);

    // A straggler tick for the same submission must not regress the model.
    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Processing,
                ..report(RemotePhase::Processing)
            },
        },
    );
    assert_eq!(state.task().phase(), TaskPhase::Complete);
}

#[test]
fn poll_failure_reaches_error_and_reenables_submit() {
    init_logging();
    let state = queued_task(&["A.mp4"]);

    let (state, _) = update(
        state,
        Msg::SubmissionFailed {
            submission: 1,
            stage: RequestStage::Poll,
            message: "http status 500".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(state.task().phase(), TaskPhase::Error);
    assert_eq!(view.status.message, "Status poll failed: http status 500");
    assert!(view.file_list.submit_enabled);
    assert_eq!(view.status.download, DownloadView::Hidden);
}

#[test]
fn download_click_fetches_once_and_records_the_result() {
    init_logging();
    let state = queued_task(&["A.mp4"]);
    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Complete,
                successful_files: vec!["A.mp4".to_string()],
                ..report(RemotePhase::Complete)
            },
        },
    );

    let (state, effects) = update(state, Msg::DownloadClicked);
    assert_eq!(
        effects,
        vec![Effect::BeginDownload {
            submission: 1,
            task_id: "t1".to_string(),
        }]
    );
    assert_eq!(state.view().status.download, DownloadView::InFlight);

    // Re-clicking while the fetch is in flight is a no-op.
    let (state, effects) = update(state, Msg::DownloadClicked);
    assert!(effects.is_empty());

    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            submission: 1,
            path: "/downloads/apng_results_t1.zip".into(),
        },
    );
    assert_eq!(
        state.view().status.download,
        DownloadView::Saved {
            path: "/downloads/apng_results_t1.zip".into()
        }
    );
}

#[test]
fn download_failure_is_reported() {
    init_logging();
    let state = queued_task(&["A.mp4"]);
    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Failed,
                successful_files: vec!["A.mp4".to_string()],
                ..report(RemotePhase::Failed)
            },
        },
    );

    let (state, _) = update(state, Msg::DownloadClicked);
    let (state, _) = update(
        state,
        Msg::DownloadFailed {
            submission: 1,
            message: "connection reset".to_string(),
        },
    );
    assert_eq!(
        state.view().status.download,
        DownloadView::Failed {
            message: "connection reset".to_string()
        }
    );
}

#[test]
fn stale_download_completion_is_ignored_after_reset() {
    init_logging();
    let state = queued_task(&["A.mp4"]);
    let (state, _) = update(
        state,
        Msg::StatusReported {
            submission: 1,
            report: StatusReport {
                phase: RemotePhase::Complete,
                successful_files: vec!["A.mp4".to_string()],
                ..report(RemotePhase::Complete)
            },
        },
    );
    let (state, _) = update(state, Msg::DownloadClicked);

    // Mutating the set abandons the task before the archive arrives.
    let (state, _) = update(state, Msg::ClearFiles);
    let (state, _) = update(
        state,
        Msg::DownloadFinished {
            submission: 1,
            path: "/downloads/apng_results_t1.zip".into(),
        },
    );
    assert_eq!(state.view().status.download, DownloadView::Hidden);
}
