pub mod error;
pub mod progress;
pub mod types;

pub use error::{RecognitionError, Result, FALLBACK_API_MESSAGE, FALLBACK_MESSAGE};
pub use progress::{ProgressSchedule, ProgressSink, ProgressTicker};
pub use types::RecognitionRequest;

use std::sync::Arc;

use async_trait::async_trait;
use facefind_common::{Config, RecognitionResult};
use reqwest::multipart::{Form, Part};
use types::RecognitionResponse;

/// Multipart field carrying the image bytes.
pub const FILE_FIELD: &str = "file";

/// Filename attached to the multipart part.
pub const FILE_NAME: &str = "capture.jpg";

/// Anything that can turn a captured image into a recognition result.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(
        &self,
        request: RecognitionRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<RecognitionResult>;
}

pub struct RecognitionClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    schedule: ProgressSchedule,
}

impl RecognitionClient {
    /// No request timeout is set; the call runs until the server answers or
    /// the caller abandons the future.
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            token: None,
            schedule: ProgressSchedule::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let client = Self::new(&config.recognize_url());
        match config.api_token.as_deref() {
            Some(token) => client.with_token(token),
            None => client,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_progress(mut self, schedule: ProgressSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submit one image. Synthetic progress runs for exactly as long as the
    /// request does and is forced to 100 before this returns.
    pub async fn submit(
        &self,
        request: &RecognitionRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<RecognitionResult> {
        let ticker = ProgressTicker::start(self.schedule, progress);
        let outcome = self.post(request).await;
        ticker.finish();

        match &outcome {
            Ok(result) => tracing::info!(
                matched = result.matched,
                photos = result.photo_urls.len(),
                "Recognition completed"
            ),
            Err(e) => tracing::warn!(error = %e, "Recognition failed"),
        }
        outcome
    }

    async fn post(&self, request: &RecognitionRequest) -> Result<RecognitionResult> {
        let image = request.image();
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(FILE_NAME)
            .mime_str(image.content_type())?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::info!(
            endpoint = %self.endpoint,
            bytes = image.len(),
            content_type = image.content_type(),
            "Submitting image for recognition"
        );

        let mut req = self.client.post(&self.endpoint).multipart(form);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;

        let status = resp.status();
        let body = resp.text().await?;
        let parsed = serde_json::from_str::<RecognitionResponse>(&body);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|r| r.message())
                .unwrap_or_else(|| FALLBACK_API_MESSAGE.to_string());
            return Err(RecognitionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(parsed?.into_result())
    }
}

#[async_trait]
impl Recognizer for RecognitionClient {
    async fn recognize(
        &self,
        request: RecognitionRequest,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<RecognitionResult> {
        self.submit(&request, progress).await
    }
}
