//! Per-session state machine sequencing discovery and summarization.
//!
//! States: `Idle -> Searching -> {ResultsReady, SearchFailed}`, then
//! conditionally `-> Summarizing -> {SummaryReady, SummaryFailed}`. A
//! summary failure keeps the discovery result; a new submission from any
//! state supersedes the previous query, cancelling its discovery request
//! and discarding its generative result on arrival.
//!
//! The generative call has no native cancellation primitive, so every
//! in-flight operation carries the `QueryId` it was started for and the
//! machine refuses to commit results whose id no longer matches the
//! session's current query.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{AiSummary, CivicDataQuery, CivicDataResult, QueryValidationError, SummaryRequest};
use crate::services::discovery::DiscoveryError;
use crate::services::last_query::LastQueryRecord;
use crate::summary::SummarizeError;

pub type QueryId = Uuid;

/// Outbound port to the civic-data service.
#[async_trait]
pub trait DiscoverPort: Send + Sync {
    async fn discover(
        &self,
        query: &CivicDataQuery,
        cancel: &CancellationToken,
    ) -> Result<CivicDataResult, DiscoveryError>;
}

/// Outbound port to the summarization pipeline.
#[async_trait]
pub trait SummarizePort: Send + Sync {
    async fn summarize(&self, request: &SummaryRequest) -> Result<AiSummary, SummarizeError>;
}

/// Outbound port to the last-query store. Best-effort only.
#[async_trait]
pub trait PersistPort: Send + Sync {
    async fn store_last_query(&self, session_key: &str, record: &LastQueryRecord);
}

/// Lifecycle of the current query within a session.
#[derive(Debug, Clone)]
pub enum QueryPhase {
    Idle,
    Searching,
    SearchFailed {
        error: String,
    },
    ResultsReady {
        result: CivicDataResult,
    },
    Summarizing {
        result: CivicDataResult,
    },
    SummaryReady {
        result: CivicDataResult,
        summary: AiSummary,
    },
    /// Terminal like `SummaryReady`, but the still-valid discovery
    /// result coexists with a non-blocking warning.
    SummaryFailed {
        result: CivicDataResult,
        warning: String,
    },
}

impl QueryPhase {
    pub fn name(&self) -> &'static str {
        match self {
            QueryPhase::Idle => "idle",
            QueryPhase::Searching => "searching",
            QueryPhase::SearchFailed { .. } => "search_failed",
            QueryPhase::ResultsReady { .. } => "results_ready",
            QueryPhase::Summarizing { .. } => "summarizing",
            QueryPhase::SummaryReady { .. } => "summary_ready",
            QueryPhase::SummaryFailed { .. } => "summary_failed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] QueryValidationError),
    /// The query was replaced by a newer submission. Expected and
    /// silent; never a user-visible error.
    #[error("query was superseded by a newer submission")]
    Superseded,
    #[error(transparent)]
    Discovery(DiscoveryError),
}

/// What a completed (non-superseded) submission yields.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query_id: QueryId,
    pub result: CivicDataResult,
    pub summary: Option<AiSummary>,
    /// Set when summarization was attempted and failed; the result above
    /// is still valid.
    pub summary_warning: Option<String>,
}

struct Session {
    current: QueryId,
    cancel: CancellationToken,
    phase: QueryPhase,
}

pub struct Orchestrator {
    discovery: Arc<dyn DiscoverPort>,
    summarizer: Arc<dyn SummarizePort>,
    persistence: Option<Arc<dyn PersistPort>>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl Orchestrator {
    pub fn new(
        discovery: Arc<dyn DiscoverPort>,
        summarizer: Arc<dyn SummarizePort>,
        persistence: Option<Arc<dyn PersistPort>>,
    ) -> Self {
        Self {
            discovery,
            summarizer,
            persistence,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of a session's current phase.
    pub fn phase(&self, session_key: &str) -> QueryPhase {
        self.sessions
            .lock()
            .get(session_key)
            .map(|s| s.phase.clone())
            .unwrap_or(QueryPhase::Idle)
    }

    /// Summary generation is skipped only when the discovery result is
    /// empty: a location-only query, a category-filtered query, and a
    /// concern-carrying query all summarize over whatever items came back.
    fn should_summarize(result: &CivicDataResult) -> bool {
        result.has_items()
    }

    /// Submit a query for a session, superseding any in-flight work.
    #[instrument(skip(self, query), fields(session = session_key, location = %query.geo.location_line()))]
    pub async fn submit(
        &self,
        session_key: &str,
        query: CivicDataQuery,
    ) -> Result<QueryOutcome, OrchestratorError> {
        // Rejected locally; never reaches a network call.
        query.validate()?;

        let (query_id, cancel) = self.begin_query(session_key);
        info!(query_id = %query_id, "Query submitted");

        let result = match self.discovery.discover(&query, &cancel).await {
            Ok(result) => result,
            Err(DiscoveryError::Cancelled) => {
                // Self-inflicted by supersession: swallow. A cancellation
                // without replacement surfaces normally.
                return if self.is_current(session_key, query_id) {
                    self.commit(session_key, query_id, QueryPhase::SearchFailed {
                        error: DiscoveryError::Cancelled.to_string(),
                    });
                    Err(OrchestratorError::Discovery(DiscoveryError::Cancelled))
                } else {
                    debug!(query_id = %query_id, "Discovery cancelled by supersession");
                    Err(OrchestratorError::Superseded)
                };
            }
            Err(e) => {
                if self.is_current(session_key, query_id) {
                    self.commit(session_key, query_id, QueryPhase::SearchFailed {
                        error: e.to_string(),
                    });
                    return Err(OrchestratorError::Discovery(e));
                }
                return Err(OrchestratorError::Superseded);
            }
        };

        if !self.commit(session_key, query_id, QueryPhase::ResultsReady {
            result: result.clone(),
        }) {
            // A newer submission won the race while we were in flight.
            debug!(query_id = %query_id, "Discarding stale discovery result");
            return Err(OrchestratorError::Superseded);
        }

        if let Some(persistence) = &self.persistence {
            persistence
                .store_last_query(
                    session_key,
                    &LastQueryRecord {
                        geo: query.geo.clone(),
                        message: query.message.clone(),
                        categories: query.categories.clone(),
                    },
                )
                .await;
        }

        if !Self::should_summarize(&result) {
            debug!(query_id = %query_id, "No items to summarize");
            return Ok(QueryOutcome {
                query_id,
                result,
                summary: None,
                summary_warning: None,
            });
        }

        self.commit(session_key, query_id, QueryPhase::Summarizing {
            result: result.clone(),
        });

        let request = SummaryRequest {
            geo: result.geo.clone(),
            sections: result.sections.clone(),
            top_categories: result.top_categories.clone(),
            user_message: query.message.clone(),
        };

        // Summarization is issued only after the discovery result is
        // accepted; the two calls are never concurrent for one query.
        let summary_result = self.summarizer.summarize(&request).await;

        if !self.is_current(session_key, query_id) {
            debug!(query_id = %query_id, "Discarding stale generative result");
            return Err(OrchestratorError::Superseded);
        }

        match summary_result {
            Ok(summary) => {
                if request.has_concern() && summary.action_plan.is_none() {
                    debug!(query_id = %query_id, "Summary accepted without actionPlan despite concern");
                }
                self.commit(session_key, query_id, QueryPhase::SummaryReady {
                    result: result.clone(),
                    summary: summary.clone(),
                });
                Ok(QueryOutcome {
                    query_id,
                    result,
                    summary: Some(summary),
                    summary_warning: None,
                })
            }
            Err(e) => {
                // Non-blocking: the user keeps their raw data.
                warn!(query_id = %query_id, error = %e, "Summarization failed");
                let warning = e.to_string();
                self.commit(session_key, query_id, QueryPhase::SummaryFailed {
                    result: result.clone(),
                    warning: warning.clone(),
                });
                Ok(QueryOutcome {
                    query_id,
                    result,
                    summary: None,
                    summary_warning: Some(warning),
                })
            }
        }
    }

    /// Allocate a new query id, cancel the superseded query's token, and
    /// enter `Searching`. The swap is atomic from the caller's view.
    fn begin_query(&self, session_key: &str) -> (QueryId, CancellationToken) {
        let query_id = Uuid::new_v4();
        let cancel = CancellationToken::new();

        let mut sessions = self.sessions.lock();
        if let Some(previous) = sessions.get(session_key) {
            previous.cancel.cancel();
        }
        sessions.insert(
            session_key.to_string(),
            Session {
                current: query_id,
                cancel: cancel.clone(),
                phase: QueryPhase::Searching,
            },
        );
        (query_id, cancel)
    }

    fn is_current(&self, session_key: &str, query_id: QueryId) -> bool {
        self.sessions
            .lock()
            .get(session_key)
            .map_or(false, |s| s.current == query_id)
    }

    /// Write a phase only if the query is still current. Returns whether
    /// the write happened.
    fn commit(&self, session_key: &str, query_id: QueryId, phase: QueryPhase) -> bool {
        let mut sessions = self.sessions.lock();
        match sessions.get_mut(session_key) {
            Some(session) if session.current == query_id => {
                debug!(query_id = %query_id, phase = phase.name(), "Phase transition");
                session.phase = phase;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl DiscoverPort for crate::services::DiscoveryClient {
    async fn discover(
        &self,
        query: &CivicDataQuery,
        cancel: &CancellationToken,
    ) -> Result<CivicDataResult, DiscoveryError> {
        crate::services::DiscoveryClient::discover(self, query, cancel).await
    }
}

#[async_trait]
impl SummarizePort for crate::summary::Summarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<AiSummary, SummarizeError> {
        crate::summary::Summarizer::summarize(self, request).await
    }
}

#[async_trait]
impl PersistPort for crate::services::LastQueryStore {
    async fn store_last_query(&self, session_key: &str, record: &LastQueryRecord) {
        // Losing the record never fails the query
        if let Err(e) = self.set(session_key, record).await {
            warn!(error = %e, "Failed to persist last-query record");
        }
    }
}
