//! Cache-purge reactor: invalidates the downstream page cache after a
//! confirmed write. Fire-and-forget; a failed purge is the purger's
//! problem and never feeds back into the write pipeline.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::OutcomeEvent;
use crate::ports::CachePurger;

use super::bus::EventBus;

pub struct PurgeReactor {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl PurgeReactor {
    /// `enabled` mirrors the `WITH_WEB_CACHE` setting; when the web
    /// cache is off there is nothing to purge.
    pub fn spawn(bus: &EventBus, purger: Arc<dyn CachePurger>, enabled: bool) -> Self {
        let mut events = bus.subscribe();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    recv = events.recv() => match recv {
                        Ok(OutcomeEvent::WriteSucceeded { operation, task_id, correlation_id }) => {
                            info!(cid = %correlation_id, task = %task_id,
                                "{operation} succeeded, purging cache");
                            if !enabled {
                                debug!(cid = %correlation_id, "cache disabled, skipping purge");
                                continue;
                            }
                            purger.purge(&task_id, &correlation_id).await;
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "purge reactor lagged behind the event bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });

        Self { shutdown_tx, join }
    }

    pub fn request_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::{CorrelationId, CreateCommand, CreatePayload, Operation, TaskCommand};

    #[derive(Default)]
    struct CountingPurger {
        purged: AtomicUsize,
    }

    #[async_trait]
    impl CachePurger for CountingPurger {
        async fn purge(&self, _task_id: &str, _cid: &CorrelationId) {
            self.purged.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn success() -> OutcomeEvent {
        OutcomeEvent::WriteSucceeded {
            operation: Operation::Create,
            task_id: "t-1".to_string(),
            correlation_id: CorrelationId::new("cid-1"),
        }
    }

    #[tokio::test]
    async fn purges_on_success_events_only() {
        let bus = EventBus::new();
        let purger = Arc::new(CountingPurger::default());
        let reactor = PurgeReactor::spawn(&bus, purger.clone(), true);

        bus.publish(success());
        bus.publish(OutcomeEvent::WriteFailed {
            command: TaskCommand::Create(CreateCommand::new(
                CreatePayload {
                    id: "t-2".to_string(),
                    title: "x".to_string(),
                    description: None,
                    status: None,
                },
                CorrelationId::new("cid-2"),
            )),
            error: "boom".to_string(),
        });
        settle().await;

        assert_eq!(purger.purged.load(Ordering::SeqCst), 1);
        reactor.shutdown_and_join().await;
    }

    #[tokio::test]
    async fn skips_purge_when_cache_is_disabled() {
        let bus = EventBus::new();
        let purger = Arc::new(CountingPurger::default());
        let reactor = PurgeReactor::spawn(&bus, purger.clone(), false);

        bus.publish(success());
        settle().await;

        assert_eq!(purger.purged.load(Ordering::SeqCst), 0);
        reactor.shutdown_and_join().await;
    }
}
