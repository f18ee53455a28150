//! Gateway to the text-generation provider (Anthropic Messages API).
//!
//! One outbound request per call, no retries, no backoff; recovery is
//! pushed to the user through the error taxonomy. Provider status codes
//! are mapped to `GenerativeError` once, here, so no caller ever
//! inspects raw status values.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::config::Settings;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum GenerativeError {
    /// No credential available. Raised before any network I/O.
    #[error("generative provider API key is not configured")]
    Unconfigured,
    /// Provider rejected the credential.
    #[error("generative provider rejected the API key")]
    Unauthorized,
    /// Provider signalled throttling. The caller may present a
    /// retry-later message; this gateway never retries on its own.
    #[error("generative provider rate limit exceeded")]
    RateLimited,
    /// Transient capacity failure at the provider.
    #[error("generative provider is temporarily overloaded")]
    Overloaded,
    /// Response carried no usable text block.
    #[error("generative response contained no text content")]
    Malformed,
    #[error("generative request transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("generative provider error: {message}")]
    Unknown { message: String },
}

/// Client for the text-generation provider.
#[derive(Clone)]
pub struct GenerativeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

impl GenerativeClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.generative_timeout_seconds))
            .build()?;

        if settings.anthropic_api_key.is_none() {
            tracing::warn!("No generative API key configured; summarization will be unavailable");
        }

        Ok(Self {
            client,
            base_url: settings.anthropic_base_url.trim_end_matches('/').to_string(),
            api_key: settings.anthropic_api_key.clone(),
            model: settings.generative_model.clone(),
            max_tokens: settings.generative_max_tokens,
            temperature: settings.generative_temperature,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Issue one request with the built prompt and return the first
    /// text-typed content block of the response.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str) -> Result<String, GenerativeError> {
        let Some(api_key) = &self.api_key else {
            return Err(GenerativeError::Unconfigured);
        };

        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, "Generative request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Generative request failed");
                GenerativeError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::map_failure(status, response).await);
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|_| GenerativeError::Malformed)?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or(GenerativeError::Malformed)
    }

    async fn map_failure(status: StatusCode, response: reqwest::Response) -> GenerativeError {
        let detail = response
            .json::<ProviderErrorBody>()
            .await
            .ok()
            .and_then(|b| b.error);
        let kind = detail.as_ref().and_then(|d| d.kind.clone());
        let message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| format!("provider returned status {status}"));

        match status.as_u16() {
            401 => GenerativeError::Unauthorized,
            429 => GenerativeError::RateLimited,
            529 => GenerativeError::Overloaded,
            _ if kind.as_deref() == Some("overloaded_error") => GenerativeError::Overloaded,
            _ => {
                error!(status = %status, message = %message, "Generative provider error");
                GenerativeError::Unknown { message }
            }
        }
    }
}
