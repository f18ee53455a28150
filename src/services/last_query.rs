//! Redis-backed persistence for the last submitted query.
//!
//! One record per installation, overwritten on each successful discovery
//! and read once at startup by the client to pre-populate the next query.
//! All failures here are logged and swallowed; losing the record never
//! fails a query.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::domain::{Category, Geography};

/// The persisted record: enough to restore the search form, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastQueryRecord {
    pub geo: Geography,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
}

#[derive(Clone)]
pub struct LastQueryStore {
    conn: ConnectionManager,
}

impl LastQueryStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Last-query store connected");

        Ok(Self { conn })
    }

    fn key(installation_id: &str) -> String {
        format!("civicscope:last_query:{installation_id}")
    }

    pub async fn get(&self, installation_id: &str) -> Option<LastQueryRecord> {
        let mut conn = self.conn.clone();
        let key = Self::key(installation_id);

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(record) => {
                    debug!(key = %key, "Last-query hit");
                    Some(record)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Failed to deserialize last-query record");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                error!(key = %key, error = %e, "Redis get error");
                None
            }
        }
    }

    /// Overwrite the installation's record. No TTL: the record lives
    /// until the next successful discovery replaces it.
    pub async fn set(&self, installation_id: &str, record: &LastQueryRecord) -> Result<()> {
        let mut conn = self.conn.clone();
        let key = Self::key(installation_id);

        let data =
            serde_json::to_string(record).context("Failed to serialize last-query record")?;
        conn.set::<_, _, ()>(&key, data)
            .await
            .context("Failed to store last-query record")?;

        debug!(key = %key, "Stored last-query record");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis ping failed")?;
        Ok(())
    }
}
