//! In-process event channel between handlers and reactors.
//!
//! A broadcast channel keeps the handlers decoupled from whoever reacts
//! to outcomes: the retry saga and the cache-purge reactor each hold
//! their own receiver and evolve independently.

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::OutcomeEvent;

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OutcomeEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an outcome. Fine to call with no subscribers (e.g. in
    /// handler unit tests); the event is simply dropped.
    pub fn publish(&self, event: OutcomeEvent) {
        if self.tx.send(event).is_err() {
            debug!("no subscribers, outcome event dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OutcomeEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CorrelationId, Operation};

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx_a = bus.subscribe();
        let mut rx_b = bus.subscribe();

        bus.publish(OutcomeEvent::WriteSucceeded {
            operation: Operation::Create,
            task_id: "t-1".to_string(),
            correlation_id: CorrelationId::new("cid-1"),
        });

        for rx in [&mut rx_a, &mut rx_b] {
            match rx.recv().await.unwrap() {
                OutcomeEvent::WriteSucceeded { task_id, .. } => assert_eq!(task_id, "t-1"),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::new();
        bus.publish(OutcomeEvent::WriteSucceeded {
            operation: Operation::Delete,
            task_id: "t-1".to_string(),
            correlation_id: CorrelationId::new("cid-1"),
        });
    }
}
