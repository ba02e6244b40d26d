//! Task aggregate: validation and mutation rules.
//!
//! Design:
//! - The aggregate is a transient, in-process reconstruction; the
//!   persistent lifecycle lives entirely in the external KV store.
//! - Validation failures are terminal for the surrounding command
//!   (retrying a structurally invalid payload can never succeed), so
//!   they get their own error type instead of the retryable paths.
//! - `TaskRecord` is the persisted shape: camelCase JSON with RFC 3339
//!   UTC timestamps, matching what the read endpoint serves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::ids::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required and must be a non-empty string")]
    EmptyField(&'static str),

    #[error("id must contain only URL-safe characters (A-Z, a-z, 0-9, -, ., _, ~)")]
    InvalidIdCharset,

    #[error("invalid status \"{0}\", allowed: pending, in_progress, done")]
    InvalidStatus(String),
}

/// Task status. Serializes as `pending` / `in_progress` / `done`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

/// Persisted shape of a task (the value stored under `task:{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update: only provided fields are applied.
/// `description: None` means "leave untouched", not "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Task aggregate root.
///
/// Invariants:
/// - `id` and `title` are non-empty and validated before any state change.
/// - `updated_at >= created_at` at all times.
/// - `id` and `created_at` are immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskAggregate {
    id: TaskId,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskAggregate {
    /// Create a new task. `status` defaults to pending.
    pub fn create(
        id: &str,
        title: &str,
        description: Option<String>,
        status: Option<TaskStatus>,
    ) -> Result<Self, ValidationError> {
        let id = TaskId::new(id)?;
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            title: title.to_string(),
            description,
            status: status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild from a persisted record without re-validating.
    /// The store is trusted: everything in it passed `create` once.
    pub fn reconstitute(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Apply a partial update. Provided fields are validated under the
    /// same rules as creation; any successful call bumps `updated_at`.
    pub fn update(&mut self, patch: TaskPatch) -> Result<(), ValidationError> {
        if let Some(title) = &patch.title
            && title.trim().is_empty()
        {
            return Err(ValidationError::EmptyField("title"));
        }

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Serialization surface: the record written to the store.
    pub fn to_record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn create_defaults_status_to_pending_and_sets_timestamps() {
        let task = TaskAggregate::create("t-1", "Buy milk", None, None).unwrap();
        assert_eq!(task.id().as_str(), "t-1");
        assert_eq!(task.title(), "Buy milk");
        assert_eq!(task.status(), TaskStatus::Pending);
        assert_eq!(task.created_at(), task.updated_at());
    }

    #[rstest]
    #[case("", "Buy milk")]
    #[case("   ", "Buy milk")]
    #[case("a#b", "Buy milk")]
    #[case("a?b", "Buy milk")]
    #[case("tåsk", "Buy milk")]
    #[case("t-1", "")]
    #[case("t-1", "   ")]
    fn create_rejects_invalid_id_or_title(#[case] id: &str, #[case] title: &str) {
        assert!(TaskAggregate::create(id, title, None, None).is_err());
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!(
            "archived".parse::<TaskStatus>(),
            Err(ValidationError::InvalidStatus("archived".to_string()))
        );
    }

    #[test]
    fn record_round_trip_is_lossless() {
        let task = TaskAggregate::create(
            "t-1",
            "Buy milk",
            Some("2 liters".to_string()),
            Some(TaskStatus::InProgress),
        )
        .unwrap();
        let record = task.to_record();

        let json = serde_json::to_string(&record).unwrap();
        let back: TaskRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);

        // Wire format is camelCase with RFC 3339 timestamps.
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"in_progress\""));
    }

    #[test]
    fn record_omits_absent_description() {
        let task = TaskAggregate::create("t-1", "Buy milk", None, None).unwrap();
        let json = serde_json::to_string(&task.to_record()).unwrap();
        assert!(!json.contains("description"));
    }

    #[test]
    fn reconstitute_round_trips_through_record() {
        let task = TaskAggregate::create("t-1", "Buy milk", None, None).unwrap();
        let back = TaskAggregate::reconstitute(task.to_record());
        assert_eq!(back, task);
    }

    #[test]
    fn update_applies_only_provided_fields() {
        let mut task =
            TaskAggregate::create("t-1", "Buy milk", Some("2 liters".to_string()), None).unwrap();
        task.update(TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        })
        .unwrap();

        assert_eq!(task.title(), "Buy milk");
        assert_eq!(task.description(), Some("2 liters"));
        assert_eq!(task.status(), TaskStatus::Done);
    }

    #[test]
    fn update_with_empty_patch_still_bumps_updated_at() {
        let mut task = TaskAggregate::create("t-1", "Buy milk", None, None).unwrap();
        let before = task.updated_at();
        task.update(TaskPatch::default()).unwrap();

        assert!(task.updated_at() >= before);
        assert!(task.updated_at() >= task.created_at());
        assert_eq!(task.title(), "Buy milk");
        assert_eq!(task.description(), None);
        assert_eq!(task.status(), TaskStatus::Pending);
    }

    #[test]
    fn update_rejects_empty_title_without_mutating() {
        let mut task = TaskAggregate::create("t-1", "Buy milk", None, None).unwrap();
        let err = task
            .update(TaskPatch {
                title: Some("  ".to_string()),
                status: Some(TaskStatus::Done),
                ..TaskPatch::default()
            })
            .unwrap_err();

        assert_eq!(err, ValidationError::EmptyField("title"));
        assert_eq!(task.title(), "Buy milk");
        assert_eq!(task.status(), TaskStatus::Pending);
    }
}
