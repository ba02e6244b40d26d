//! Commands: immutable, retry-aware mutation intents.
//!
//! A command is constructed once per inbound trigger (or once per retry)
//! and consumed exactly once by dispatch. "Retry" never mutates in place:
//! `with_next_attempt()` produces a structural clone with `attempt + 1`,
//! so the same value can be re-enqueued from a concurrent timer without
//! aliasing issues.

use serde::{Deserialize, Serialize};

use super::event::Operation;
use super::ids::CorrelationId;
use super::task::{TaskPatch, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayload {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl UpdatePayload {
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCommand {
    pub payload: CreatePayload,
    pub correlation_id: CorrelationId,
    pub attempt: u32,
}

impl CreateCommand {
    pub fn new(payload: CreatePayload, correlation_id: CorrelationId) -> Self {
        Self {
            payload,
            correlation_id,
            attempt: 0,
        }
    }

    pub fn with_next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCommand {
    pub payload: UpdatePayload,
    pub correlation_id: CorrelationId,
    pub attempt: u32,
}

impl UpdateCommand {
    pub fn new(payload: UpdatePayload, correlation_id: CorrelationId) -> Self {
        Self {
            payload,
            correlation_id,
            attempt: 0,
        }
    }

    pub fn with_next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCommand {
    pub task_id: String,
    pub correlation_id: CorrelationId,
    pub attempt: u32,
}

impl DeleteCommand {
    pub fn new(task_id: impl Into<String>, correlation_id: CorrelationId) -> Self {
        Self {
            task_id: task_id.into(),
            correlation_id,
            attempt: 0,
        }
    }

    pub fn with_next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}

/// The command family: three flat variants sharing the retry contract.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCommand {
    Create(CreateCommand),
    Update(UpdateCommand),
    Delete(DeleteCommand),
}

impl TaskCommand {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Create(_) => Operation::Create,
            Self::Update(_) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
        }
    }

    /// The id of the task this command targets (unvalidated, as received).
    pub fn task_id(&self) -> &str {
        match self {
            Self::Create(c) => &c.payload.id,
            Self::Update(c) => &c.payload.id,
            Self::Delete(c) => &c.task_id,
        }
    }

    pub fn correlation_id(&self) -> &CorrelationId {
        match self {
            Self::Create(c) => &c.correlation_id,
            Self::Update(c) => &c.correlation_id,
            Self::Delete(c) => &c.correlation_id,
        }
    }

    pub fn attempt(&self) -> u32 {
        match self {
            Self::Create(c) => c.attempt,
            Self::Update(c) => c.attempt,
            Self::Delete(c) => c.attempt,
        }
    }

    /// Clone with `attempt + 1`, identical payload and correlation id.
    pub fn with_next_attempt(&self) -> Self {
        match self {
            Self::Create(c) => Self::Create(c.with_next_attempt()),
            Self::Update(c) => Self::Update(c.with_next_attempt()),
            Self::Delete(c) => Self::Delete(c.with_next_attempt()),
        }
    }
}

impl From<CreateCommand> for TaskCommand {
    fn from(c: CreateCommand) -> Self {
        Self::Create(c)
    }
}

impl From<UpdateCommand> for TaskCommand {
    fn from(c: UpdateCommand) -> Self {
        Self::Update(c)
    }
}

impl From<DeleteCommand> for TaskCommand {
    fn from(c: DeleteCommand) -> Self {
        Self::Delete(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_command(attempt: u32) -> TaskCommand {
        let cmd = TaskCommand::Create(CreateCommand::new(
            CreatePayload {
                id: "t-1".to_string(),
                title: "Test".to_string(),
                description: None,
                status: None,
            },
            CorrelationId::new("cid-1"),
        ));
        (0..attempt).fold(cmd, |c, _| c.with_next_attempt())
    }

    #[test]
    fn new_commands_start_at_attempt_zero() {
        assert_eq!(create_command(0).attempt(), 0);
    }

    #[test]
    fn with_next_attempt_increments_and_preserves_everything_else() {
        let cmd = create_command(2);
        let next = cmd.with_next_attempt();

        assert_eq!(next.attempt(), 3);
        assert_eq!(next.correlation_id(), cmd.correlation_id());
        assert_eq!(next.task_id(), cmd.task_id());
        assert_eq!(next.operation(), cmd.operation());
        // The original is untouched.
        assert_eq!(cmd.attempt(), 2);
    }

    #[test]
    fn task_id_is_exposed_for_every_variant() {
        let cid = CorrelationId::new("cid-1");
        let update = TaskCommand::Update(UpdateCommand::new(
            UpdatePayload {
                id: "t-2".to_string(),
                title: None,
                description: None,
                status: None,
            },
            cid.clone(),
        ));
        let delete = TaskCommand::Delete(DeleteCommand::new("t-3", cid));

        assert_eq!(update.task_id(), "t-2");
        assert_eq!(delete.task_id(), "t-3");
        assert_eq!(update.operation(), Operation::Update);
        assert_eq!(delete.operation(), Operation::Delete);
    }
}
