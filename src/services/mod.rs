//! Service layer modules for external collaborators.
//!
//! Contains the generative provider gateway, the civic-data discovery
//! client, and the Redis-backed last-query store.

pub mod discovery;
pub mod generative;
pub mod last_query;

pub use discovery::{DiscoveryClient, DiscoveryError};
pub use generative::{GenerativeClient, GenerativeError};
pub use last_query::LastQueryStore;
