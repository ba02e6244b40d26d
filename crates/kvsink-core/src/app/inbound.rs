//! Inbound boundary: bus messages → commands.
//!
//! Thin layer over the message-bus payloads (`tasks.created`,
//! `tasks.updated`, `tasks.deleted`): decode, mint a correlation id when
//! the message carries none, build a fresh command with `attempt = 0`.
//! All business logic lives in the handlers; retry logic in the saga.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    CorrelationId, CreateCommand, CreatePayload, DeleteCommand, TaskCommand, TaskStatus,
    UpdateCommand, UpdatePayload,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InboundError {
    #[error("message is missing a task id")]
    MissingId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedMessage {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedMessage {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMessage {
    pub id: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

fn correlation_id(given: Option<String>) -> CorrelationId {
    match given {
        Some(cid) if !cid.is_empty() => CorrelationId::new(cid),
        _ => CorrelationId::mint(),
    }
}

/// Structural id validation happens in the create handler; nothing to
/// reject here.
pub fn command_from_created(msg: CreatedMessage) -> TaskCommand {
    let cid = correlation_id(msg.correlation_id);
    TaskCommand::Create(CreateCommand::new(
        CreatePayload {
            id: msg.id,
            title: msg.title,
            description: msg.description,
            status: msg.status,
        },
        cid,
    ))
}

pub fn command_from_updated(msg: UpdatedMessage) -> Result<TaskCommand, InboundError> {
    if msg.id.is_empty() {
        return Err(InboundError::MissingId);
    }
    let cid = correlation_id(msg.correlation_id);
    Ok(TaskCommand::Update(UpdateCommand::new(
        UpdatePayload {
            id: msg.id,
            title: msg.title,
            description: msg.description,
            status: msg.status,
        },
        cid,
    )))
}

pub fn command_from_deleted(msg: DeletedMessage) -> Result<TaskCommand, InboundError> {
    if msg.id.is_empty() {
        return Err(InboundError::MissingId);
    }
    let cid = correlation_id(msg.correlation_id);
    Ok(TaskCommand::Delete(DeleteCommand::new(msg.id, cid)))
}
