//! HTTP client for the upstream chat endpoint.
//!
//! One call: `POST <base>/chat/message`. The response shape is
//! unconstrained and goes through the normalizer; a body that is not
//! valid JSON is treated as a plain string reply.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::DraftError;
use crate::normalize::normalize;

/// JSON body of the chat call. Optional fields are omitted entirely when
/// absent (not serialized as `null`).
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Anything that can turn a [`ChatRequest`] into generated text.
///
/// The auto-pilot loop is generic over this trait so tests can substitute
/// a mock endpoint with call counting and artificial delays.
pub trait Generate: Send + Sync {
    /// Dispatch one generation call and return the normalized text.
    ///
    /// Implementations return [`DraftError::EmptyResponse`] when the call
    /// succeeded but no text could be extracted.
    fn generate(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<String, DraftError>> + Send;
}

/// Configuration for [`ChatClient`].
#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    /// Base URL of the chat API (e.g. `http://127.0.0.1:8000`).
    pub base_url: String,
    /// TCP connection timeout.
    pub connect_timeout: Duration,
    /// Per-request read timeout.
    pub request_timeout: Duration,
}

impl ChatClientConfig {
    /// Config with default timeouts: 5 s connect, 30 s per request.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub struct ChatClient {
    config: ChatClientConfig,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Self {
        // reqwest::Client::builder() can fail in extreme environments, but
        // unwrap_or_default() falls back to a default client instead of panicking.
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        ChatClient { config, client }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/message", self.config.base_url.trim_end_matches('/'))
    }

    /// POST the request and return the raw response value.
    ///
    /// A non-JSON body is wrapped as `Value::String` so the normalizer
    /// can still accept a bare-text reply.
    async fn send(&self, request: &ChatRequest) -> Result<Value, DraftError> {
        let url = self.endpoint();
        debug!(url = %url, chars = request.message.len(), "dispatching generation request");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| DraftError::Network {
                url: url.clone(),
                source: e,
            })?;

        if !resp.status().is_success() {
            return Err(DraftError::Http {
                status: resp.status().as_u16(),
                url,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| DraftError::Network {
            url: url.clone(),
            source: e,
        })?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
        }
    }
}

impl Generate for ChatClient {
    fn generate(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<String, DraftError>> + Send {
        async move {
            let value = self.send(&request).await?;
            let text = normalize(&value);
            if text.is_empty() {
                Err(DraftError::EmptyResponse)
            } else {
                Ok(text)
            }
        }
    }
}
