pub mod health;
pub mod query;
pub mod summarize;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/summarize", post(summarize::generate_summary))
        .route("/api/query", post(query::submit_query))
        .route("/api/last-query", get(query::get_last_query))
}
