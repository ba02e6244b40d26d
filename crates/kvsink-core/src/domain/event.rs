//! Outcome events published by the command handlers.
//!
//! Exactly one event per handled command, except the terminal
//! validation / not-found paths which emit nothing. The failure event
//! carries the whole original command: it is the only state that
//! survives between a failed attempt and the next one.

use std::fmt;

use super::command::TaskCommand;
use super::ids::CorrelationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeEvent {
    /// The write landed and the read-back confirmed it.
    WriteSucceeded {
        operation: Operation,
        task_id: String,
        correlation_id: CorrelationId,
    },

    /// The write (or its verification) failed. Input to the retry saga.
    WriteFailed {
        command: TaskCommand,
        error: String,
    },
}

impl OutcomeEvent {
    pub fn correlation_id(&self) -> &CorrelationId {
        match self {
            Self::WriteSucceeded { correlation_id, .. } => correlation_id,
            Self::WriteFailed { command, .. } => command.correlation_id(),
        }
    }
}
