//! Domain identifiers.
//!
//! Both ids are strings on the wire. `TaskId` is validated on the way in
//! (URL-safe charset, non-empty) because it ends up in KV keys and request
//! paths; `CorrelationId` is an opaque trace token and is never inspected.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

use super::task::ValidationError;

/// Identifier of a task. URL-safe charset: `[A-Za-z0-9._~-]+`.
///
/// `new()` validates; serde is transparent and trusts persisted data
/// (records coming back from the store were validated when written).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'~' | b'-'))
        {
            return Err(ValidationError::InvalidIdCharset);
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque trace token threaded through a command/event chain for log
/// correlation. Carries no business meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wrap an id handed to us by the upstream bus.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Mint a fresh id when the inbound message carries none.
    /// ULID: sortable by creation time, no coordination needed.
    pub fn mint() -> Self {
        Self(Ulid::new().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("t-1")]
    #[case("a.b_c~d-e")]
    #[case("0123456789")]
    fn accepts_url_safe_ids(#[case] id: &str) {
        assert!(TaskId::new(id).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("a#b")]
    #[case("a?b")]
    #[case("a b")]
    #[case("täsk")]
    fn rejects_non_url_safe_ids(#[case] id: &str) {
        assert!(TaskId::new(id).is_err());
    }

    #[test]
    fn task_id_serde_is_transparent() {
        let id = TaskId::new("t-1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"t-1\"");
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn minted_correlation_ids_are_unique() {
        let a = CorrelationId::mint();
        let b = CorrelationId::mint();
        assert_ne!(a, b);
    }
}
