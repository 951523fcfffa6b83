//! Gradio space HTTP client.

use std::time::Duration;

use futures_util::StreamExt;
use hotscore_models::{PredictionValue, UploadedImage};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, Response};
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::error::{GradioError, GradioResult, Step};
use crate::event_stream::PredictionReader;
use crate::types::{EventId, SubmitRequest, SubmitResponse, UploadHandle};

const DEFAULT_BASE_URL: &str = "https://jasonfor2020-jb-hot-regression.hf.space";
const MAX_BACKOFF_MS: u64 = 60_000;

/// Configuration for the Gradio client.
#[derive(Debug, Clone)]
pub struct GradioClientConfig {
    /// Base URL of the space
    pub base_url: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Extra attempts on transient failures (0 = single shot)
    pub max_retries: u32,
}

impl Default for GradioClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            max_retries: 0,
        }
    }
}

impl GradioClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GRADIO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("GRADIO_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("GRADIO_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            max_retries: std::env::var("GRADIO_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Config pointing at a specific base URL, other values default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Client for the hosted prediction space.
pub struct GradioClient {
    http: Client,
    config: GradioClientConfig,
}

impl GradioClient {
    /// Create a new client. The base URL must be an absolute http(s) URL.
    pub fn new(mut config: GradioClientConfig) -> GradioResult<Self> {
        let parsed = url::Url::parse(&config.base_url)
            .map_err(|e| GradioError::InvalidConfig(format!("{}: {}", config.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GradioError::InvalidConfig(format!(
                "unsupported scheme in {}",
                config.base_url
            )));
        }
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(GradioError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> GradioResult<Self> {
        Self::new(GradioClientConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Check if the space answers its info endpoint.
    pub async fn health_check(&self) -> GradioResult<bool> {
        let url = format!("{}/gradio_api/info", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                warn!("Space health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Space health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Upload image bytes under a fresh upload id.
    pub async fn upload(&self, image: &UploadedImage) -> GradioResult<UploadHandle> {
        self.upload_with_id(Uuid::new_v4(), image).await
    }

    /// Upload image bytes as multipart field `files`.
    #[instrument(skip(self, image), fields(size = image.size()))]
    pub async fn upload_with_id(
        &self,
        upload_id: Uuid,
        image: &UploadedImage,
    ) -> GradioResult<UploadHandle> {
        let url = format!(
            "{}/gradio_api/upload?upload_id={}",
            self.config.base_url, upload_id
        );

        let response = self
            .with_retry(|| async {
                let part = Part::bytes(image.bytes().to_vec())
                    .file_name(image.file_name().to_string())
                    .mime_str(image.mime().as_str())
                    .map_err(GradioError::Network)?;
                let form = Form::new().part("files", part);

                let response = self
                    .http
                    .post(&url)
                    .multipart(form)
                    .send()
                    .await
                    .map_err(GradioError::Network)?;
                ensure_success(Step::Upload, response).await
            })
            .await?;

        let body = response.text().await?;
        let paths: Vec<String> = serde_json::from_str(&body)?;

        let handle = paths
            .into_iter()
            .next()
            .map(UploadHandle)
            .ok_or_else(|| GradioError::InvalidResponse {
                step: Step::Upload,
                message: "upload returned no paths".to_string(),
            })?;

        debug!(handle = %handle, "Image uploaded to space");
        Ok(handle)
    }

    /// Submit a prediction job for an uploaded file.
    #[instrument(skip(self))]
    pub async fn submit(&self, handle: &UploadHandle) -> GradioResult<EventId> {
        let url = format!("{}/gradio_api/call/predict", self.config.base_url);
        let request = SubmitRequest::for_upload(handle);

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(GradioError::Network)?;
                ensure_success(Step::Submit, response).await
            })
            .await?;

        let body = response.text().await?;
        let submitted: SubmitResponse = serde_json::from_str(&body)?;

        if submitted.event_id.is_empty() {
            return Err(GradioError::InvalidResponse {
                step: Step::Submit,
                message: "empty event_id".to_string(),
            });
        }

        debug!(event_id = %submitted.event_id, "Prediction submitted");
        Ok(EventId(submitted.event_id))
    }

    /// Read the job's event stream until its `complete` event.
    #[instrument(skip(self))]
    pub async fn fetch_result(&self, event_id: &EventId) -> GradioResult<PredictionValue> {
        let url = format!(
            "{}/gradio_api/call/predict/{}",
            self.config.base_url, event_id
        );

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .get(&url)
                    .header(header::ACCEPT, "text/event-stream")
                    .send()
                    .await
                    .map_err(GradioError::Network)?;
                ensure_success(Step::Result, response).await
            })
            .await?;

        let mut reader = PredictionReader::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            if let Some(outcome) = reader.push(&chunk?) {
                return Ok(outcome?);
            }
        }

        Ok(reader.finish()?)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> GradioResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = GradioResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "Space request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Exponential backoff from 500ms, capped at one minute.
fn backoff_delay(attempt: u32) -> Duration {
    let millis = 2u64
        .checked_pow(attempt)
        .and_then(|factor| factor.checked_mul(500))
        .unwrap_or(u64::MAX);
    Duration::from_millis(millis.min(MAX_BACKOFF_MS))
}

/// Turn a non-2xx response into [`GradioError::Status`], logging the body.
async fn ensure_success(step: Step, response: Response) -> GradioResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!(step = %step, status = status.as_u16(), body = %body, "Space call failed");

    Err(GradioError::Status {
        step,
        status: status.as_u16(),
        body,
    })
}
