use std::sync::mpsc;
use std::thread;

use client_logging::{client_info, client_warn};
use eframe::egui;
use vidpng_core::{Effect, Msg};
use vidpng_engine::{EngineConfig, EngineEvent, EngineHandle, ServiceSettings, UploadFile};

use crate::settings::ClientSettings;

/// Bridges the pure core to the engine: effects become engine commands, and
/// engine events are pumped back into the message channel.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        settings: &ClientSettings,
        msg_tx: mpsc::Sender<Msg>,
        repaint: egui::Context,
    ) -> anyhow::Result<Self> {
        let config = EngineConfig {
            service: ServiceSettings {
                base_url: settings.service_url.clone(),
                ..ServiceSettings::default()
            },
            download_dir: settings.download_dir.clone(),
        };
        let (engine, events) = EngineHandle::new(config)?;
        spawn_event_pump(events, msg_tx, repaint);
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::CancelSubmission { submission } => {
                    client_info!("cancelling submission {submission}");
                    self.engine.cancel(submission);
                }
                Effect::BeginSubmission {
                    submission,
                    files,
                    fps,
                } => {
                    client_info!(
                        "starting submission {submission} with {} file(s)",
                        files.len()
                    );
                    let files = files
                        .into_iter()
                        .map(|file| UploadFile {
                            name: file.name,
                            media_type: file.media_type,
                            path: file.path,
                        })
                        .collect();
                    self.engine.submit(submission, files, fps);
                }
                Effect::BeginDownload {
                    submission,
                    task_id,
                } => {
                    client_info!("fetching archive for task {task_id}");
                    self.engine.download(submission, task_id);
                }
            }
        }
    }
}

fn spawn_event_pump(
    events: mpsc::Receiver<EngineEvent>,
    msg_tx: mpsc::Sender<Msg>,
    repaint: egui::Context,
) {
    thread::spawn(move || {
        while let Ok(event) = events.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
            // Wake the UI so the update is visible without user input.
            repaint.request_repaint();
        }
    });
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadAccepted {
            submission,
            task_id,
        } => Msg::UploadAccepted {
            submission,
            task_id,
        },
        EngineEvent::ConvertAccepted { submission } => Msg::ConvertAccepted { submission },
        EngineEvent::StatusReported { submission, report } => Msg::StatusReported {
            submission,
            report: map_report(report),
        },
        EngineEvent::SubmissionFailed {
            submission,
            stage,
            message,
        } => {
            client_warn!("submission {submission}: {stage} stage failed: {message}");
            Msg::SubmissionFailed {
                submission,
                stage: map_stage(stage),
                message,
            }
        }
        EngineEvent::DownloadFinished { submission, path } => {
            Msg::DownloadFinished { submission, path }
        }
        EngineEvent::DownloadFailed {
            submission,
            message,
        } => Msg::DownloadFailed {
            submission,
            message,
        },
    }
}

fn map_report(report: vidpng_engine::StatusReport) -> vidpng_core::StatusReport {
    vidpng_core::StatusReport {
        phase: map_phase(report.phase),
        progress: report.progress,
        total_files: report.total_files,
        processed_files: report.processed_files,
        fps: report.fps,
        successful_files: report.successful_files,
        failed_files: report
            .failed_files
            .into_iter()
            .map(|failure| vidpng_core::FailureRecord {
                file_name: failure.file_name,
                message: failure.message,
            })
            .collect(),
    }
}

fn map_phase(phase: vidpng_engine::RemotePhase) -> vidpng_core::RemotePhase {
    match phase {
        vidpng_engine::RemotePhase::Uploaded => vidpng_core::RemotePhase::Uploaded,
        vidpng_engine::RemotePhase::Queued => vidpng_core::RemotePhase::Queued,
        vidpng_engine::RemotePhase::Processing => vidpng_core::RemotePhase::Processing,
        vidpng_engine::RemotePhase::Complete => vidpng_core::RemotePhase::Complete,
        vidpng_engine::RemotePhase::Failed => vidpng_core::RemotePhase::Failed,
    }
}

fn map_stage(stage: vidpng_engine::RequestStage) -> vidpng_core::RequestStage {
    match stage {
        vidpng_engine::RequestStage::Upload => vidpng_core::RequestStage::Upload,
        vidpng_engine::RequestStage::Convert => vidpng_core::RequestStage::Convert,
        vidpng_engine::RequestStage::Poll => vidpng_core::RequestStage::Poll,
        vidpng_engine::RequestStage::Download => vidpng_core::RequestStage::Download,
    }
}
