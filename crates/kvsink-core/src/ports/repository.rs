//! Repository port: read/write/delete contract over the backing store.
//!
//! Design intent:
//! - Ordinary "not found" is `Ok(None)`, never an error. `Err` is
//!   reserved for transport-level failures (the catch-all retry path).
//! - `save`/`delete` report soft failure as `Ok(false)`: the store
//!   answered but refused or dropped the write.
//! - No retry logic here; retries are entirely the saga's job.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CorrelationId, TaskId, TaskRecord};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist the record. `Ok(false)` means the store reported failure.
    async fn save(
        &self,
        record: &TaskRecord,
        correlation_id: &CorrelationId,
    ) -> Result<bool, RepositoryError>;

    /// Look up a record. `Ok(None)` for absent.
    async fn find_by_id(
        &self,
        id: &TaskId,
        correlation_id: &CorrelationId,
    ) -> Result<Option<TaskRecord>, RepositoryError>;

    /// Remove the record. `Ok(false)` means the store reported failure.
    async fn delete(
        &self,
        id: &TaskId,
        correlation_id: &CorrelationId,
    ) -> Result<bool, RepositoryError>;
}

/// KV key format: `task:{id}`.
pub fn kv_key(id: &TaskId) -> String {
    format!("task:{id}")
}
