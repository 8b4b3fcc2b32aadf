//! Remote text classification client.
//!
//! A [`Classifier`] turns one text fragment into a [`ClassificationResponse`].
//! [`HttpClassifier`] talks to an HTTP endpoint that accepts
//! `{"text": "..."}` and answers `{"predicted_class": <int>}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::error::{ClassifyError, FlagError};

/// Class value that marks a fragment as a match unless configured otherwise.
pub const DEFAULT_POSITIVE_CLASS: i64 = 1;

/// Longest response body excerpt kept in errors.
const BODY_EXCERPT_LEN: usize = 200;

/// Request body sent for each candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub text: String,
}

/// Response body returned by the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub predicted_class: i64,
    /// Echo of the submitted text, when the server sends one back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
}

/// Anything that can classify a text fragment.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassificationResponse, ClassifyError>;

    /// Human-readable target, used in logs and reports.
    fn endpoint(&self) -> &str;
}

/// Decides whether a response is a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassMatcher {
    pub positive_class: i64,
}

impl ClassMatcher {
    pub fn new(positive_class: i64) -> Self {
        Self { positive_class }
    }

    pub fn matches(&self, response: &ClassificationResponse) -> bool {
        response.predicted_class == self.positive_class
    }
}

impl Default for ClassMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_POSITIVE_CLASS)
    }
}

/// JSON-over-HTTP classifier.
pub struct HttpClassifier {
    client: reqwest::Client,
    endpoint: String,
    timeout_ms: u64,
}

impl HttpClassifier {
    /// Create a classifier posting to `endpoint`, giving each request
    /// `timeout_ms` to complete.
    pub fn new(endpoint: &str, timeout_ms: u64) -> Result<Self, FlagError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(FlagError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            timeout_ms,
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self, FlagError> {
        Self::new(&config.endpoint, config.timeout_ms)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClassifyError {
        if err.is_timeout() {
            ClassifyError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            ClassifyError::Transport(err)
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResponse, ClassifyError> {
        let request = ClassificationRequest {
            text: text.to_string(),
        };
        debug!(endpoint = %self.endpoint, text = %request.text, "sending classification request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!(status = status.as_u16(), body = %body, "classification response");

        if !status.is_success() {
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        parse_response(&body)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Decode a response body, requiring an integer `predicted_class`.
pub fn parse_response(body: &str) -> Result<ClassificationResponse, ClassifyError> {
    serde_json::from_str(body).map_err(|e| ClassifyError::Decode {
        message: e.to_string(),
        body: excerpt(body),
    })
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
