use std::time::Duration;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use studio_logging::{studio_debug, studio_trace};
use url::Url;

use crate::upload::UploadFile;
use crate::{ApiError, CreatedJob, FailureKind, HealthReport, JobStatusReport};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_upload_bytes: u64,
    pub max_download_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_upload_bytes: 20 * 1024 * 1024,
            max_download_bytes: 200 * 1024 * 1024,
        }
    }
}

impl ApiSettings {
    /// Builds `{base_url}/{segments...}`, percent-encoding each segment and
    /// keeping any path prefix already present in the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::new(
                    FailureKind::InvalidUrl,
                    format!("{} cannot be used as a base url", self.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// The job-processing HTTP API this client talks to.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    async fn create_job(&self, upload: UploadFile) -> Result<CreatedJob, ApiError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ApiError>;

    async fn health(&self) -> Result<HealthReport, ApiError>;

    /// Downloads a result asset by absolute URL.
    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestJobApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestJobApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        studio_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl JobApi for ReqwestJobApi {
    async fn create_job(&self, upload: UploadFile) -> Result<CreatedJob, ApiError> {
        let url = self.settings.endpoint(&["api", "generate"])?;
        studio_debug!(
            "POST {} file={} bytes={} mime={}",
            url,
            upload.file_name,
            upload.bytes.len(),
            upload.mime
        );

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.mime)
            .map_err(|err| {
                ApiError::new(
                    FailureKind::UnsupportedFile { extension: None },
                    err.to_string(),
                )
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;
        response
            .json::<CreatedJob>()
            .await
            .map_err(map_reqwest_error)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusReport, ApiError> {
        let url = self.settings.endpoint(&["api", "jobs", job_id])?;
        self.get_json(url).await
    }

    async fn health(&self) -> Result<HealthReport, ApiError> {
        let url = self.settings.endpoint(&["api", "health"])?;
        self.get_json(url).await
    }

    async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let parsed =
            Url::parse(url).map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let max_bytes = self.settings.max_download_bytes;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response)?;

        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::new(
            FailureKind::HttpStatus(status.as_u16()),
            format!("{} answered {}", response.url(), status),
        ))
    }
}

fn too_large(max_bytes: u64, actual: u64) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
