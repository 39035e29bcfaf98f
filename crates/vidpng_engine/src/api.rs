use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::types::{ConvertRequest, ErrorBody, UploadResponse};
use crate::{ApiError, ApiErrorKind, StatusReport};

/// Connection settings for the remote conversion service.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(3000),
        }
    }
}

/// One file of the upload batch, streamed from disk at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub media_type: String,
    pub path: PathBuf,
}

/// The four operations of the conversion-service contract.
#[async_trait::async_trait]
pub trait ConversionApi: Send + Sync {
    /// Uploads the whole batch; returns the task identifier the service
    /// issued for it.
    async fn upload(&self, files: &[UploadFile]) -> Result<String, ApiError>;

    /// Asks the service to start converting the uploaded batch, optionally
    /// at a caller-chosen frame rate (the service default applies otherwise).
    async fn convert(&self, task_id: &str, fps: Option<u32>) -> Result<(), ApiError>;

    async fn status(&self, task_id: &str) -> Result<StatusReport, ApiError>;

    /// Fetches the ZIP archive of successful outputs.
    async fn download(&self, task_id: &str) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestApi {
    pub fn new(settings: &ServiceSettings) -> Result<Self, ApiError> {
        // Connect timeout only. A request that made it onto the wire may
        // take as long as the transfer takes; an abandoned task is reset by
        // the user, not by a deadline.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(ApiErrorKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl ConversionApi for ReqwestApi {
    async fn upload(&self, files: &[UploadFile]) -> Result<String, ApiError> {
        let mut form = Form::new();
        for file in files {
            let handle = tokio::fs::File::open(&file.path).await.map_err(|err| {
                ApiError::new(
                    ApiErrorKind::Io,
                    format!("cannot open {}: {err}", file.name),
                )
            })?;
            let body = reqwest::Body::wrap_stream(ReaderStream::new(handle));
            let part = Part::stream(body)
                .file_name(file.name.clone())
                .mime_str(&file.media_type)
                .map_err(|err| ApiError::new(ApiErrorKind::Io, err.to_string()))?;
            form = form.part("files", part);
        }

        let response = self
            .client
            .post(self.endpoint("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response).await?;
        let decoded: UploadResponse = response
            .json()
            .await
            .map_err(|err| ApiError::new(ApiErrorKind::Decode, err.to_string()))?;
        Ok(decoded.task_id)
    }

    async fn convert(&self, task_id: &str, fps: Option<u32>) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/convert"))
            .json(&ConvertRequest { task_id, fps })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        // The acknowledgement body carries nothing the client needs.
        check_status(response).await?;
        Ok(())
    }

    async fn status(&self, task_id: &str) -> Result<StatusReport, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/status/{task_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|err| ApiError::new(ApiErrorKind::Decode, err.to_string()))
    }

    async fn download(&self, task_id: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/download/{task_id}")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response).await?;

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

/// Resolves a non-success response into the remote-supplied detail when the
/// error body decodes, otherwise the transport status text.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    let message = match serde_json::from_slice::<ErrorBody>(&body) {
        Ok(body) => body.detail,
        Err(_) => status.to_string(),
    };
    Err(ApiError::new(
        ApiErrorKind::HttpStatus(status.as_u16()),
        message,
    ))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(ApiErrorKind::Timeout, err.to_string());
    }
    ApiError::new(ApiErrorKind::Network, err.to_string())
}
