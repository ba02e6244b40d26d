//! Verification port: read-after-write checks against the store's read
//! endpoint.
//!
//! All three checks answer a plain yes/no. Implementations fold their
//! own transport failures into `false` — an unreachable read endpoint
//! and an unconfirmed write look the same to the handler, and both feed
//! the same retry path.

use async_trait::async_trait;

use crate::domain::{CorrelationId, TaskId, TaskRecord};

#[async_trait]
pub trait WriteVerifier: Send + Sync {
    /// After create: the task is now externally readable.
    async fn confirm_exists(&self, id: &TaskId, correlation_id: &CorrelationId) -> bool;

    /// After update: the readable record's mutable fields match what was
    /// just written.
    async fn confirm_fields(
        &self,
        id: &TaskId,
        expected: &TaskRecord,
        correlation_id: &CorrelationId,
    ) -> bool;

    /// After delete: the task is no longer readable.
    async fn confirm_absent(&self, id: &TaskId, correlation_id: &CorrelationId) -> bool;
}
