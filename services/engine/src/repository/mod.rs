//! Booster persistence
//!
//! The manager hands full per-actor snapshots to a `BoosterStore` and reads
//! them back on startup. Stores replace an actor's rows wholesale, so writes
//! are idempotent and the last one wins.

mod memory;
mod redis_booster_store;

use async_trait::async_trait;
use shared::{ActorId, Booster};
use std::collections::HashMap;

pub use memory::InMemoryBoosterStore;
pub use redis_booster_store::RedisBoosterStore;

pub type Snapshot = HashMap<ActorId, Vec<Booster>>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Redis(e) => {
                e.is_io_error() || e.is_timeout() || e.is_connection_dropped() || e.is_connection_refusal()
            }
            StoreError::Unavailable(_) => true,
            StoreError::Serialization(_) | StoreError::InvalidRecord(_) => false,
        }
    }
}

#[async_trait]
pub trait BoosterStore: Send + Sync {
    /// Replace the stored rows of every actor in the snapshot
    async fn save_all(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// All rows still active at `now_ms`, grouped by actor and sorted by expiry
    async fn load_all(&self, now_ms: i64) -> Result<Snapshot, StoreError>;

    async fn load_actor(&self, actor: ActorId, now_ms: i64) -> Result<Vec<Booster>, StoreError>;

    /// Drop rows that ended at or before `now_ms`; returns how many were removed
    async fn delete_expired(&self, now_ms: i64) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    fn backend_name(&self) -> &'static str;
}

fn sort_by_expiry(boosters: &mut [Booster]) {
    boosters.sort_by_key(|b| (b.end_ms(), b.booster_type()));
}
