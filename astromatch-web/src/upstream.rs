//! Upstream compatibility API client
//!
//! Thin JSON/binary passthrough to the external service that computes
//! reports and renders PDFs. Responses are returned unchanged; only
//! transport failures are reshaped into [`UpstreamError`].

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("AstroMatch/", env!("CARGO_PKG_VERSION"));

/// Upstream client errors
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

/// Client for the compatibility API under `api_base`
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    pub fn new(api_base: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// POST a JSON body; non-success statuses become [`UpstreamError::Status`]
    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response, UpstreamError> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!(url = %url, "Calling upstream");

        let mut request = self.http_client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("X-API-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn post_for_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, UpstreamError> {
        self.post(path, body)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::Parse(e.to_string()))
    }

    /// Compute a compatibility report (`{person1, person2, email}`)
    pub async fn compatibility<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value, UpstreamError> {
        self.post_for_json("/astromatch", body).await
    }

    /// Batch compatibility computation
    pub async fn match_multiple(&self, body: &Value) -> Result<Value, UpstreamError> {
        self.post_for_json("/match-multiple", body).await
    }

    /// Render the PDF report (`{person1, person2, report}`)
    pub async fn pdf<B: Serialize + ?Sized>(&self, body: &B) -> Result<Vec<u8>, UpstreamError> {
        let bytes = self.post("/astromatch/pdf", body).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Email capture (`{email}`)
    pub async fn save_email<B: Serialize + ?Sized>(&self, body: &B) -> Result<(), UpstreamError> {
        self.post("/astromatch/save-email", body).await.map(|_| ())
    }

    pub async fn log_event<B: Serialize + ?Sized>(&self, event: &B) -> Result<(), UpstreamError> {
        self.post("/astromatch/log", event).await.map(|_| ())
    }

    /// Tell the upstream a checkout session completed
    pub async fn verify_access(&self, session_id: &str) -> Result<(), UpstreamError> {
        self.post("/astromatch/verify-access", &json!({ "session_id": session_id }))
            .await
            .map(|_| ())
    }
}
