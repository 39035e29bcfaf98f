use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::{client_debug, client_info, client_warn};
use tokio_util::sync::CancellationToken;

use crate::poller::poll_task;
use crate::storage::AtomicFileWriter;
use crate::{
    ConversionApi, EngineEvent, ReqwestApi, RequestStage, ServiceSettings, SubmissionId,
    UploadFile,
};

/// Engine configuration: service settings plus where result archives land.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub service: ServiceSettings,
    pub download_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_download_dir(download_dir: PathBuf) -> Self {
        Self {
            service: ServiceSettings::default(),
            download_dir,
        }
    }
}

enum EngineCommand {
    Submit {
        submission: SubmissionId,
        files: Vec<UploadFile>,
        fps: Option<u32>,
    },
    Cancel {
        submission: SubmissionId,
    },
    Download {
        submission: SubmissionId,
        task_id: String,
    },
}

/// Command side of the engine.
///
/// Construction spawns a dedicated thread owning a tokio runtime; events come
/// back on the returned receiver. At most one submission pipeline is live at
/// a time: submitting again cancels the previous pipeline's token before the
/// new one starts, and `cancel` stops a pipeline only while its id is still
/// the live one.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), crate::ApiError> {
        let api: Arc<dyn ConversionApi> = Arc::new(ReqwestApi::new(&config.service)?);
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let poll_interval = config.service.poll_interval;
        let download_dir = config.download_dir;

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut active: Option<(SubmissionId, CancellationToken)> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Submit {
                        submission,
                        files,
                        fps,
                    } => {
                        if let Some((stale, token)) = active.take() {
                            client_info!("submission {stale} superseded by {submission}");
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        active = Some((submission, token.clone()));

                        let api = api.clone();
                        let events = event_tx.clone();
                        runtime.spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => {
                                    client_debug!("submission {submission} cancelled");
                                }
                                _ = run_submission(
                                    api.as_ref(),
                                    submission,
                                    files,
                                    fps,
                                    poll_interval,
                                    &events,
                                ) => {}
                            }
                        });
                    }
                    EngineCommand::Cancel { submission } => {
                        // Only the still-live submission may be cancelled by id.
                        if let Some((_, token)) = active.take_if(|(live, _)| *live == submission) {
                            token.cancel();
                        }
                    }
                    EngineCommand::Download {
                        submission,
                        task_id,
                    } => {
                        let api = api.clone();
                        let events = event_tx.clone();
                        let dir = download_dir.clone();
                        runtime.spawn(async move {
                            run_download(api.as_ref(), submission, &task_id, &dir, &events).await;
                        });
                    }
                }
            }
        });

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn submit(&self, submission: SubmissionId, files: Vec<UploadFile>, fps: Option<u32>) {
        let _ = self.cmd_tx.send(EngineCommand::Submit {
            submission,
            files,
            fps,
        });
    }

    pub fn cancel(&self, submission: SubmissionId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { submission });
    }

    pub fn download(&self, submission: SubmissionId, task_id: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            submission,
            task_id: task_id.into(),
        });
    }
}

/// The submission pipeline. Each stage's failure short-circuits the rest and
/// surfaces as a single failure event for this submission.
async fn run_submission(
    api: &dyn ConversionApi,
    submission: SubmissionId,
    files: Vec<UploadFile>,
    fps: Option<u32>,
    poll_interval: Duration,
    events: &mpsc::Sender<EngineEvent>,
) {
    client_info!(
        "submission {submission}: uploading {} file(s)",
        files.len()
    );
    let task_id = match api.upload(&files).await {
        Ok(task_id) => task_id,
        Err(err) => {
            client_warn!("submission {submission}: upload failed: {err}");
            let _ = events.send(EngineEvent::SubmissionFailed {
                submission,
                stage: RequestStage::Upload,
                message: err.to_string(),
            });
            return;
        }
    };
    let _ = events.send(EngineEvent::UploadAccepted {
        submission,
        task_id: task_id.clone(),
    });

    if let Err(err) = api.convert(&task_id, fps).await {
        client_warn!("submission {submission}: convert failed: {err}");
        let _ = events.send(EngineEvent::SubmissionFailed {
            submission,
            stage: RequestStage::Convert,
            message: err.to_string(),
        });
        return;
    }
    let _ = events.send(EngineEvent::ConvertAccepted { submission });

    poll_task(api, submission, &task_id, poll_interval, events).await;
}

async fn run_download(
    api: &dyn ConversionApi,
    submission: SubmissionId,
    task_id: &str,
    download_dir: &Path,
    events: &mpsc::Sender<EngineEvent>,
) {
    let filename = format!("apng_results_{task_id}.zip");
    let written = match api.download(task_id).await {
        Ok(bytes) => AtomicFileWriter::new(download_dir.to_path_buf())
            .write(&filename, &bytes)
            .map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    };

    match written {
        Ok(path) => {
            client_info!("task {task_id}: archive saved to {}", path.display());
            let _ = events.send(EngineEvent::DownloadFinished { submission, path });
        }
        Err(message) => {
            client_warn!("task {task_id}: download failed: {message}");
            let _ = events.send(EngineEvent::DownloadFailed {
                submission,
                message,
            });
        }
    }
}
