mod app;
mod config;
mod domain;
mod error;
mod logging;
mod orchestrator;
mod routes;
mod services;
mod summary;

use anyhow::Result;
use std::sync::Arc;

use domain::officials::OfficialsDirectory;
use orchestrator::Orchestrator;
use services::{DiscoveryClient, GenerativeClient, LastQueryStore};
use summary::Summarizer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting CivicScope backend"
    );

    // Officials reference dataset: injected file or the built-in default
    let officials = match &settings.officials_file {
        Some(path) => Arc::new(OfficialsDirectory::from_file(path)?),
        None => Arc::new(OfficialsDirectory::default()),
    };
    tracing::info!(officials = officials.officials.len(), "Officials directory loaded");

    // Last-query store
    let last_query = LastQueryStore::new(&settings.redis_url).await?;

    // External service clients
    let discovery = DiscoveryClient::new(&settings)?;
    let generative = GenerativeClient::new(&settings)?;
    let summarizer = Summarizer::new(generative, officials);

    // Optionally check the discovery service (non-blocking)
    tokio::spawn({
        let discovery = discovery.clone();
        async move {
            match discovery.health_check().await {
                Ok(()) => tracing::info!("Civic data service is healthy"),
                Err(e) => tracing::warn!(error = %e, "Civic data service health check failed - will retry on first request"),
            }
        }
    });

    // Orchestrator wired to the real collaborators
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(discovery.clone()),
        Arc::new(summarizer.clone()),
        Some(Arc::new(last_query.clone()) as Arc<dyn orchestrator::PersistPort>),
    ));

    // Create application state
    let state = app::AppState::new(settings.clone(), discovery, summarizer, last_query, orchestrator);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
