//! Domain types for civic data and AI summaries.
//!
//! The civic types mirror the civic-data discovery service's JSON schema;
//! the summary types mirror the JSON the generative model is instructed
//! to emit.

pub mod civic;
pub mod officials;
pub mod summary;

pub use civic::*;
pub use summary::*;
