//! Cache-invalidation port, consumed by the success-event reactor.

use async_trait::async_trait;

use crate::domain::CorrelationId;

/// Fire-and-forget purge of the downstream page cache.
/// Implementations must swallow their own failures; a missed purge is a
/// stale page, never a failed write.
#[async_trait]
pub trait CachePurger: Send + Sync {
    async fn purge(&self, task_id: &str, correlation_id: &CorrelationId);
}
