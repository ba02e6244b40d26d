//! Command handlers: validate, write, verify, emit exactly one outcome.
//!
//! Failure taxonomy (who decides what):
//! - Validation errors and update-of-missing-task are terminal here:
//!   log and drop, no event. Attempt counts cannot fix a structurally
//!   invalid payload, and an update cannot retry a task into existence.
//! - Store-reported failures, transport errors and failed read-backs
//!   all publish `WriteFailed` carrying the original command; the saga
//!   owns everything from there.
//!
//! Handlers never let an error escape their boundary.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{
    CreateCommand, DeleteCommand, OutcomeEvent, TaskAggregate, TaskId, UpdateCommand,
};
use crate::ports::{TaskRepository, WriteVerifier};

use super::bus::EventBus;

pub const SAVE_FAILED: &str = "repository save operation failed";
pub const DELETE_FAILED: &str = "repository delete operation failed";
pub const VERIFY_FAILED: &str = "read-back verification failed";

pub struct CreateTaskHandler {
    repo: Arc<dyn TaskRepository>,
    verifier: Arc<dyn WriteVerifier>,
    bus: EventBus,
}

impl CreateTaskHandler {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        verifier: Arc<dyn WriteVerifier>,
        bus: EventBus,
    ) -> Self {
        Self {
            repo,
            verifier,
            bus,
        }
    }

    pub async fn execute(&self, command: CreateCommand) {
        let cid = &command.correlation_id;
        let payload = &command.payload;
        info!(cid = %cid, task = %payload.id, attempt = command.attempt, "CREATE");

        let task = match TaskAggregate::create(
            &payload.id,
            &payload.title,
            payload.description.clone(),
            payload.status,
        ) {
            Ok(task) => task,
            Err(e) => {
                // Terminal: a retried attempt would fail validation again.
                error!(cid = %cid, task = %payload.id, attempt = command.attempt,
                    "CREATE validation failed, dropping command: {e}");
                return;
            }
        };

        let record = task.to_record();
        match self.repo.save(&record, cid).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(cid = %cid, task = %payload.id, attempt = command.attempt,
                    "CREATE failed: repository returned false");
                self.bus.publish(OutcomeEvent::WriteFailed {
                    command: command.clone().into(),
                    error: SAVE_FAILED.to_string(),
                });
                return;
            }
            Err(e) => {
                error!(cid = %cid, task = %payload.id, attempt = command.attempt,
                    "CREATE failed: {e}");
                self.bus.publish(OutcomeEvent::WriteFailed {
                    command: command.clone().into(),
                    error: e.to_string(),
                });
                return;
            }
        }

        if !self.verifier.confirm_exists(&record.id, cid).await {
            warn!(cid = %cid, task = %payload.id, attempt = command.attempt,
                "CREATE verification failed");
            self.bus.publish(OutcomeEvent::WriteFailed {
                command: command.clone().into(),
                error: VERIFY_FAILED.to_string(),
            });
            return;
        }

        self.bus.publish(OutcomeEvent::WriteSucceeded {
            operation: crate::domain::Operation::Create,
            task_id: payload.id.clone(),
            correlation_id: cid.clone(),
        });
    }
}

pub struct UpdateTaskHandler {
    repo: Arc<dyn TaskRepository>,
    verifier: Arc<dyn WriteVerifier>,
    bus: EventBus,
}

impl UpdateTaskHandler {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        verifier: Arc<dyn WriteVerifier>,
        bus: EventBus,
    ) -> Self {
        Self {
            repo,
            verifier,
            bus,
        }
    }

    pub async fn execute(&self, command: UpdateCommand) {
        let cid = &command.correlation_id;
        let payload = &command.payload;
        info!(cid = %cid, task = %payload.id, attempt = command.attempt, "UPDATE");

        let id = match TaskId::new(&payload.id) {
            Ok(id) => id,
            Err(e) => {
                error!(cid = %cid, task = %payload.id, attempt = command.attempt,
                    "UPDATE validation failed, dropping command: {e}");
                return;
            }
        };

        let record = match self.repo.find_by_id(&id, cid).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                // Terminal: the task may have been deleted concurrently;
                // an update cannot bring it back.
                warn!(cid = %cid, task = %id, "task not found, skipping update");
                return;
            }
            Err(e) => {
                error!(cid = %cid, task = %id, attempt = command.attempt, "UPDATE failed: {e}");
                self.bus.publish(OutcomeEvent::WriteFailed {
                    command: command.clone().into(),
                    error: e.to_string(),
                });
                return;
            }
        };

        let mut task = TaskAggregate::reconstitute(record);
        if let Err(e) = task.update(payload.to_patch()) {
            error!(cid = %cid, task = %id, attempt = command.attempt,
                "UPDATE validation failed, dropping command: {e}");
            return;
        }

        let record = task.to_record();
        match self.repo.save(&record, cid).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(cid = %cid, task = %id, attempt = command.attempt,
                    "UPDATE failed: repository returned false");
                self.bus.publish(OutcomeEvent::WriteFailed {
                    command: command.clone().into(),
                    error: SAVE_FAILED.to_string(),
                });
                return;
            }
            Err(e) => {
                error!(cid = %cid, task = %id, attempt = command.attempt, "UPDATE failed: {e}");
                self.bus.publish(OutcomeEvent::WriteFailed {
                    command: command.clone().into(),
                    error: e.to_string(),
                });
                return;
            }
        }

        if !self.verifier.confirm_fields(&id, &record, cid).await {
            warn!(cid = %cid, task = %id, attempt = command.attempt, "UPDATE verification failed");
            self.bus.publish(OutcomeEvent::WriteFailed {
                command: command.clone().into(),
                error: VERIFY_FAILED.to_string(),
            });
            return;
        }

        self.bus.publish(OutcomeEvent::WriteSucceeded {
            operation: crate::domain::Operation::Update,
            task_id: payload.id.clone(),
            correlation_id: cid.clone(),
        });
    }
}

pub struct DeleteTaskHandler {
    repo: Arc<dyn TaskRepository>,
    verifier: Arc<dyn WriteVerifier>,
    bus: EventBus,
}

impl DeleteTaskHandler {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        verifier: Arc<dyn WriteVerifier>,
        bus: EventBus,
    ) -> Self {
        Self {
            repo,
            verifier,
            bus,
        }
    }

    pub async fn execute(&self, command: DeleteCommand) {
        let cid = &command.correlation_id;
        info!(cid = %cid, task = %command.task_id, attempt = command.attempt, "DELETE");

        let id = match TaskId::new(&command.task_id) {
            Ok(id) => id,
            Err(e) => {
                // An id that fails the charset rule can never be in the
                // store; retrying the delete is pointless.
                error!(cid = %cid, task = %command.task_id, attempt = command.attempt,
                    "DELETE validation failed, dropping command: {e}");
                return;
            }
        };

        match self.repo.delete(&id, cid).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(cid = %cid, task = %id, attempt = command.attempt,
                    "DELETE failed: repository returned false");
                self.bus.publish(OutcomeEvent::WriteFailed {
                    command: command.clone().into(),
                    error: DELETE_FAILED.to_string(),
                });
                return;
            }
            Err(e) => {
                error!(cid = %cid, task = %id, attempt = command.attempt, "DELETE failed: {e}");
                self.bus.publish(OutcomeEvent::WriteFailed {
                    command: command.clone().into(),
                    error: e.to_string(),
                });
                return;
            }
        }

        if !self.verifier.confirm_absent(&id, cid).await {
            warn!(cid = %cid, task = %id, attempt = command.attempt, "DELETE verification failed");
            self.bus.publish(OutcomeEvent::WriteFailed {
                command: command.clone().into(),
                error: VERIFY_FAILED.to_string(),
            });
            return;
        }

        self.bus.publish(OutcomeEvent::WriteSucceeded {
            operation: crate::domain::Operation::Delete,
            task_id: command.task_id.clone(),
            correlation_id: cid.clone(),
        });
    }
}
