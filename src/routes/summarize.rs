//! Thin pass-through endpoint for summary generation.
//!
//! POST /api/summarize: builds the prompt, makes the single generative
//! call, validates the output. Input problems are rejected before any
//! generative call is attempted.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::app::AppState;
use crate::domain::{AiSummary, SummaryRequest, MAX_MESSAGE_LEN};
use crate::error::{ApiError, ApiResult};

#[derive(Serialize)]
pub struct SummarizeResponse {
    pub summary: AiSummary,
}

pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummaryRequest>,
) -> ApiResult<Json<SummarizeResponse>> {
    if request.geo.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: geo and sections".to_string(),
        ));
    }
    if request.sections.is_empty() {
        return Err(ApiError::BadRequest("No data to summarize".to_string()));
    }
    if let Some(message) = &request.user_message {
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(ApiError::BadRequest(format!(
                "user_message exceeds {MAX_MESSAGE_LEN} characters"
            )));
        }
    }

    info!(
        location = %request.geo.location_line(),
        sections = request.sections.len(),
        has_concern = request.has_concern(),
        "Summarize request"
    );

    let summary = state.summarizer.summarize(&request).await?;

    Ok(Json(SummarizeResponse { summary }))
}
