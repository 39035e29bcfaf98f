use std::fs;
use std::sync::mpsc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidpng_engine::{
    EngineConfig, EngineEvent, EngineHandle, RemotePhase, RequestStage, ServiceSettings,
    UploadFile,
};

fn config(server: &MockServer, dir: &TempDir) -> EngineConfig {
    EngineConfig {
        service: ServiceSettings {
            base_url: server.uri(),
            // Fast cadence keeps these tests short; production uses 3 s.
            poll_interval: Duration::from_millis(50),
            ..ServiceSettings::default()
        },
        download_dir: dir.path().to_path_buf(),
    }
}

fn staged_files(dir: &TempDir, names: &[&str]) -> Vec<UploadFile> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, b"frames").unwrap();
            UploadFile {
                name: name.to_string(),
                media_type: "video/mp4".to_string(),
                path,
            }
        })
        .collect()
}

fn next_event(events: &mpsc::Receiver<EngineEvent>) -> EngineEvent {
    events
        .recv_timeout(Duration::from_secs(5))
        .expect("engine event")
}

async fn mount_upload_and_convert(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1"})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "queued"})))
        .mount(server)
        .await;
}

async fn count_status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path().starts_with("/status/"))
        .count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pipeline_reports_each_stage_then_stops_polling() {
    let server = MockServer::start().await;
    mount_upload_and_convert(&server).await;
    // The first poll sees a task in flight, every later one a finished task.
    Mock::given(method("GET"))
        .and(path("/status/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "progress": 0.0,
            "total_files": 1,
            "processed_files": 0,
            "successful_files": [],
            "failed_files": [],
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "complete",
            "progress": 1.0,
            "total_files": 1,
            "processed_files": 1,
            "fps": 15,
            "successful_files": ["a.png"],
            "failed_files": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::new(config(&server, &dir)).expect("engine");
    engine.submit(1, staged_files(&dir, &["a.mp4"]), None);

    assert_eq!(
        next_event(&events),
        EngineEvent::UploadAccepted {
            submission: 1,
            task_id: "t1".to_string(),
        }
    );
    assert_eq!(
        next_event(&events),
        EngineEvent::ConvertAccepted { submission: 1 }
    );
    match next_event(&events) {
        EngineEvent::StatusReported {
            submission: 1,
            report,
        } => {
            assert_eq!(report.phase, RemotePhase::Processing);
            assert_eq!((report.processed_files, report.total_files), (0, 1));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    match next_event(&events) {
        EngineEvent::StatusReported {
            submission: 1,
            report,
        } => {
            assert_eq!(report.phase, RemotePhase::Complete);
            assert_eq!(report.successful_files, vec!["a.png".to_string()]);
            assert_eq!(report.fps, Some(15));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // Terminal report stopped the poller: the channel stays quiet and no
    // further status request is issued.
    assert!(events.recv_timeout(Duration::from_millis(300)).is_err());
    assert_eq!(count_status_requests(&server).await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn convert_rejection_short_circuits_before_any_poll() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "invalid frame rate"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::new(config(&server, &dir)).expect("engine");
    engine.submit(1, staged_files(&dir, &["a.mp4"]), Some(9999));

    assert_eq!(
        next_event(&events),
        EngineEvent::UploadAccepted {
            submission: 1,
            task_id: "t1".to_string(),
        }
    );
    assert_eq!(
        next_event(&events),
        EngineEvent::SubmissionFailed {
            submission: 1,
            stage: RequestStage::Convert,
            message: "invalid frame rate".to_string(),
        }
    );

    // The pipeline never reached the poller.
    assert!(events.recv_timeout(Duration::from_millis(300)).is_err());
    assert_eq!(count_status_requests(&server).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn poll_failure_stops_the_poller_without_retry() {
    let server = MockServer::start().await;
    mount_upload_and_convert(&server).await;
    Mock::given(method("GET"))
        .and(path("/status/t1"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "status store offline"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::new(config(&server, &dir)).expect("engine");
    engine.submit(1, staged_files(&dir, &["a.mp4"]), None);

    assert_eq!(
        next_event(&events),
        EngineEvent::UploadAccepted {
            submission: 1,
            task_id: "t1".to_string(),
        }
    );
    assert_eq!(
        next_event(&events),
        EngineEvent::ConvertAccepted { submission: 1 }
    );
    assert_eq!(
        next_event(&events),
        EngineEvent::SubmissionFailed {
            submission: 1,
            stage: RequestStage::Poll,
            message: "status store offline".to_string(),
        }
    );

    // No automatic retry after a failed poll.
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(count_status_requests(&server).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancellation_stops_the_event_flow() {
    let server = MockServer::start().await;
    mount_upload_and_convert(&server).await;
    // The task never finishes on its own.
    Mock::given(method("GET"))
        .and(path("/status/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "total_files": 1,
            "processed_files": 0,
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::new(config(&server, &dir)).expect("engine");
    engine.submit(1, staged_files(&dir, &["a.mp4"]), None);

    // Let the poller produce at least one report, then cancel.
    loop {
        if let EngineEvent::StatusReported { .. } = next_event(&events) {
            break;
        }
    }
    engine.cancel(1);

    // Flush anything that was already in flight at the cancel point.
    std::thread::sleep(Duration::from_millis(150));
    while events.try_recv().is_ok() {}

    // A live poller at 50 ms cadence would land several events in this
    // window; silence means the pipeline is gone.
    assert!(events.recv_timeout(Duration::from_millis(300)).is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn download_saves_the_archive_atomically() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/t9"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip-bytes".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::new(config(&server, &dir)).expect("engine");
    engine.download(3, "t9");

    match next_event(&events) {
        EngineEvent::DownloadFinished {
            submission: 3,
            path,
        } => {
            assert_eq!(path.file_name().unwrap(), "apng_results_t9.zip");
            assert_eq!(fs::read(&path).unwrap(), b"zip-bytes");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn download_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/t9"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "nothing to download"})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (engine, events) = EngineHandle::new(config(&server, &dir)).expect("engine");
    engine.download(3, "t9");

    assert_eq!(
        next_event(&events),
        EngineEvent::DownloadFailed {
            submission: 3,
            message: "nothing to download".to_string(),
        }
    );
}
