//! Command dispatch: one command, exactly one handler.
//!
//! The command family is closed, so routing is a match over the sum
//! type instead of a string-keyed registry. The caller awaits the
//! handler's completion; unrelated in-flight commands are not blocked
//! (handlers only hold locks inside the repository implementations).
//!
//! No retry logic lives here. The saga re-enters through this same
//! `dispatch` entry point with an incremented-attempt clone, and fresh
//! commands and retries are indistinguishable to this layer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::TaskCommand;
use crate::ports::{TaskRepository, WriteVerifier};

use super::bus::EventBus;
use super::handlers::{CreateTaskHandler, DeleteTaskHandler, UpdateTaskHandler};

/// Dispatch seam. The saga holds this instead of the concrete
/// dispatcher so its re-dispatch path can be observed in tests.
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, command: TaskCommand);
}

pub struct CommandDispatcher {
    create: CreateTaskHandler,
    update: UpdateTaskHandler,
    delete: DeleteTaskHandler,
}

impl CommandDispatcher {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        verifier: Arc<dyn WriteVerifier>,
        bus: EventBus,
    ) -> Self {
        Self {
            create: CreateTaskHandler::new(Arc::clone(&repo), Arc::clone(&verifier), bus.clone()),
            update: UpdateTaskHandler::new(Arc::clone(&repo), Arc::clone(&verifier), bus.clone()),
            delete: DeleteTaskHandler::new(repo, verifier, bus),
        }
    }

    pub async fn dispatch(&self, command: TaskCommand) {
        match command {
            TaskCommand::Create(c) => self.create.execute(c).await,
            TaskCommand::Update(c) => self.update.execute(c).await,
            TaskCommand::Delete(c) => self.delete.execute(c).await,
        }
    }
}

#[async_trait]
impl Dispatch for CommandDispatcher {
    async fn dispatch(&self, command: TaskCommand) {
        CommandDispatcher::dispatch(self, command).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CorrelationId, CreateCommand, CreatePayload, OutcomeEvent};
    use crate::impls::memory::{InMemoryTaskRepository, InMemoryVerifier};

    #[tokio::test]
    async fn dispatch_routes_to_the_matching_handler() {
        let repo = Arc::new(InMemoryTaskRepository::new());
        let verifier = Arc::new(InMemoryVerifier::new(Arc::clone(&repo)));
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let dispatcher = CommandDispatcher::new(repo, verifier, bus);

        dispatcher
            .dispatch(TaskCommand::Create(CreateCommand::new(
                CreatePayload {
                    id: "t-1".to_string(),
                    title: "Buy milk".to_string(),
                    description: None,
                    status: None,
                },
                CorrelationId::new("cid-1"),
            )))
            .await;

        assert!(matches!(
            rx.try_recv().unwrap(),
            OutcomeEvent::WriteSucceeded { .. }
        ));
    }
}
