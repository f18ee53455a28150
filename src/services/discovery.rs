//! Client for the civic-data discovery service.
//!
//! One request per query with cooperative cancellation. `Cancelled` is a
//! distinct variant so the orchestrator can tell a superseded request
//! apart from a user-visible failure.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument};

use crate::config::Settings;
use crate::domain::{CivicDataQuery, CivicDataResult};

/// Longest response-body snippet carried in an `InvalidResponse` failure.
const MAX_BODY_SNIPPET: usize = 200;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Caller-initiated cancellation. Swallowed by the orchestrator when
    /// it results from supersession, surfaced otherwise.
    #[error("discovery request was cancelled")]
    Cancelled,
    #[error("discovery response was not parseable: {snippet}")]
    InvalidResponse { snippet: String },
    #[error("discovery service error ({status}): {message}")]
    HttpError { status: u16, message: String },
    #[error("discovery transport failure: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Error message field carried on non-success discovery responses.
#[derive(Deserialize)]
struct ServiceError {
    error: Option<String>,
}

#[derive(Clone)]
pub struct DiscoveryClient {
    client: Client,
    base_url: String,
}

impl DiscoveryClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.discover_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.discover_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Issue one discovery request, racing it against the cancellation
    /// token.
    #[instrument(skip(self, query, cancel), fields(location = %query.geo.location_line()))]
    pub async fn discover(
        &self,
        query: &CivicDataQuery,
        cancel: &CancellationToken,
    ) -> Result<CivicDataResult, DiscoveryError> {
        if cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        let url = format!("{}/api/v1/discover/", self.base_url);
        debug!(url = %url, "Discovery request");

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
            res = self.client.post(&url).json(query).send() => res.map_err(|e| {
                error!(error = %e, "Discovery request failed");
                DiscoveryError::Transport(e)
            })?,
        };

        let status = response.status();
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(DiscoveryError::Cancelled),
            body = response.text() => body.map_err(DiscoveryError::Transport)?,
        };

        if !status.is_success() {
            let message = serde_json::from_str::<ServiceError>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_string()
                });
            return Err(DiscoveryError::HttpError {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|_| DiscoveryError::InvalidResponse {
            snippet: body.chars().take(MAX_BODY_SNIPPET).collect(),
        })
    }

    /// Cheap reachability probe used by the health endpoint.
    pub async fn health_check(&self) -> anyhow::Result<()> {
        let url = format!("{}/health", self.base_url);
        self.client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::domain::{Geography, QueryLimits};

    fn client() -> DiscoveryClient {
        let settings = Settings {
            env: Environment::Dev,
            server_addr: "0.0.0.0:8080".into(),
            discover_base_url: "http://localhost:5001/".into(),
            discover_timeout_seconds: 30,
            discover_per_category_limit: 5,
            redis_url: "redis://localhost:6379/0".into(),
            cors_allow_origins: vec![],
            anthropic_api_key: None,
            anthropic_base_url: "https://api.anthropic.com".into(),
            generative_model: "m".into(),
            generative_max_tokens: 1,
            generative_temperature: 0.0,
            generative_timeout_seconds: 45,
            officials_file: None,
        };
        DiscoveryClient::new(&settings).unwrap()
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits() {
        let client = client();
        let query = CivicDataQuery {
            geo: Geography {
                state_name: Some("California".into()),
                ..Default::default()
            },
            message: None,
            categories: None,
            limits: QueryLimits::default(),
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.discover(&query, &cancel).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Cancelled));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        assert_eq!(client().base_url, "http://localhost:5001");
    }

    #[test]
    fn error_field_is_preferred_over_status_text() {
        let body = r#"{"error": "city not covered"}"#;
        let msg = serde_json::from_str::<ServiceError>(body)
            .ok()
            .and_then(|e| e.error)
            .unwrap();
        assert_eq!(msg, "city not covered");
    }
}
