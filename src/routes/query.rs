//! Orchestrated query endpoints.
//!
//! POST /api/query runs the full discovery-to-summary pipeline for one
//! installation session; GET /api/last-query returns the persisted
//! record used to pre-populate the next query.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::{AppState, X_INSTALLATION_ID};
use crate::domain::{AiSummary, Category, CivicDataQuery, CivicDataResult, Geography, QueryLimits};
use crate::error::{ApiError, ApiResult};
use crate::orchestrator::OrchestratorError;
use crate::services::last_query::LastQueryRecord;

#[derive(Deserialize)]
pub struct QueryRequest {
    pub geo: Geography,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

#[derive(Serialize)]
pub struct QueryResponse {
    pub query_id: Uuid,
    pub result: CivicDataResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AiSummary>,
    /// Summarization failed but the result above is still valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_warning: Option<String>,
}

fn installation_id(headers: &HeaderMap) -> String {
    headers
        .get(X_INSTALLATION_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or("default")
        .to_string()
}

pub async fn submit_query(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let installation = installation_id(&headers);

    let query = CivicDataQuery {
        geo: request.geo,
        message: request.message,
        categories: request.categories,
        limits: QueryLimits {
            per_category: state.settings.discover_per_category_limit,
        },
    };

    let outcome = state
        .orchestrator
        .submit(&installation, query)
        .await
        .map_err(|e| match e {
            OrchestratorError::InvalidInput(v) => ApiError::BadRequest(v.to_string()),
            OrchestratorError::Superseded => {
                ApiError::Conflict("Query was superseded by a newer submission".to_string())
            }
            OrchestratorError::Discovery(d) => d.into(),
        })?;

    Ok(Json(QueryResponse {
        query_id: outcome.query_id,
        result: outcome.result,
        summary: outcome.summary,
        summary_warning: outcome.summary_warning,
    }))
}

pub async fn get_last_query(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<Option<LastQueryRecord>> {
    let installation = installation_id(&headers);
    Json(state.last_query.get(&installation).await)
}
