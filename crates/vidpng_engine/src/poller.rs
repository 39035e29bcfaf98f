use std::sync::mpsc;
use std::time::Duration;

use client_logging::client_debug;
use tokio::time::MissedTickBehavior;

use crate::{ConversionApi, EngineEvent, RequestStage, SubmissionId};

/// Repeats the status request at a fixed cadence until the task reports a
/// terminal phase or a request fails.
///
/// The interval's first tick completes immediately, so the initial fetch
/// happens without waiting out a full period. Ticks are serialized: a slow
/// response delays the next fetch instead of overlapping it.
pub(crate) async fn poll_task(
    api: &dyn ConversionApi,
    submission: SubmissionId,
    task_id: &str,
    interval: Duration,
    events: &mpsc::Sender<EngineEvent>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match api.status(task_id).await {
            Ok(report) => {
                let terminal = report.phase.is_terminal();
                let _ = events.send(EngineEvent::StatusReported { submission, report });
                if terminal {
                    client_debug!("task {task_id}: terminal phase reported, polling stops");
                    break;
                }
            }
            Err(err) => {
                // No automatic retry: the user resubmits explicitly.
                let _ = events.send(EngineEvent::SubmissionFailed {
                    submission,
                    stage: RequestStage::Poll,
                    message: err.to_string(),
                });
                break;
            }
        }
    }
}
