//! Retry saga: turns failure events into delayed, bounded re-dispatch.
//!
//! Flow:
//!   handler fails → publishes `WriteFailed`
//!   → saga checks `attempt < MAX_RETRIES`
//!   → waits `RETRY_DELAYS[attempt]`
//!   → re-dispatches the same command with `attempt + 1`
//!   → at `MAX_RETRIES`, logs the give-up at error level and stops.
//!
//! Each failure event gets its own spawned task, so unrelated commands
//! retry in parallel and the saga never blocks the bus. State is the
//! in-flight timers only; a process exit drops pending retries (the
//! upstream bus may redeliver the trigger, or the write is lost).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::domain::{OutcomeEvent, TaskCommand};

use super::bus::EventBus;
use super::dispatch::Dispatch;

/// Backoff schedule per attempt: 1s, 3s, 10s, 20s, 30s.
pub const RETRY_DELAYS: [Duration; 5] = [
    Duration::from_secs(1),
    Duration::from_secs(3),
    Duration::from_secs(10),
    Duration::from_secs(20),
    Duration::from_secs(30),
];

pub const MAX_RETRIES: u32 = RETRY_DELAYS.len() as u32;

/// Handle to the running saga loop.
pub struct RetrySaga {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RetrySaga {
    pub fn spawn(bus: &EventBus, dispatcher: Arc<dyn Dispatch>) -> Self {
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
                        Ok(OutcomeEvent::WriteFailed { command, error }) => {
                            let dispatcher = Arc::clone(&dispatcher);
                            tokio::spawn(retry_later(command, error, dispatcher));
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "saga lagged behind the event bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });

        Self { shutdown_tx, join }
    }

    /// Stop taking new failure events. Timers already in flight are not
    /// cancelled; they fire unless the process exits first.
    pub fn request_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

/// One retry chain step, run independently per failure event.
async fn retry_later(command: TaskCommand, error: String, dispatcher: Arc<dyn Dispatch>) {
    let attempt = command.attempt();
    let cid = command.correlation_id().clone();

    if attempt >= MAX_RETRIES {
        error!(cid = %cid, task = %command.task_id(),
            "GIVING UP after {MAX_RETRIES} retries: {error}");
        return;
    }

    let delay = RETRY_DELAYS[attempt as usize];
    warn!(cid = %cid, task = %command.task_id(),
        "retry {}/{MAX_RETRIES} in {}ms: {error}", attempt + 1, delay.as_millis());

    tokio::time::sleep(delay).await;
    dispatcher.dispatch(command.with_next_attempt()).await;
}
