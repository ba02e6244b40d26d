//! Domain model: ids, the task aggregate, commands, outcome events.

pub mod command;
pub mod event;
pub mod ids;
pub mod task;

pub use command::{
    CreateCommand, CreatePayload, DeleteCommand, TaskCommand, UpdateCommand, UpdatePayload,
};
pub use event::{Operation, OutcomeEvent};
pub use ids::{CorrelationId, TaskId};
pub use task::{TaskAggregate, TaskPatch, TaskRecord, TaskStatus, ValidationError};
