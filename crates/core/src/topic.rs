//! Topic records, input payloads, and field validation.
//!
//! A [`Topic`] is one snapshot of a versioned tree node. The live record of a
//! topic is the newest snapshot and is the only one that takes part in the
//! hierarchy; older snapshots are kept unchanged in the version history.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Timestamp, TopicId, Version};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed length of a topic name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum allowed length of topic content, in characters.
pub const MAX_CONTENT_LENGTH: usize = 100_000;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A versioned, hierarchical content node.
///
/// `child_ids` is derived from the hierarchy index whenever the record is
/// materialized and is never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub version: Version,
    pub name: String,
    pub content: String,
    pub parent_id: Option<TopicId>,
    pub child_ids: Vec<TopicId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Topic {
    /// Strip the derived fields, producing the record handed to persistence.
    pub fn to_record(&self) -> TopicRecord {
        TopicRecord {
            id: self.id,
            version: self.version,
            name: self.name.clone(),
            content: self.content.clone(),
            parent_id: self.parent_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Plain persisted form of a topic snapshot (no derived children).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: TopicId,
    pub version: Version,
    pub name: String,
    pub content: String,
    pub parent_id: Option<TopicId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TopicRecord> for Topic {
    fn from(record: TopicRecord) -> Self {
        Topic {
            id: record.id,
            version: record.version,
            name: record.name,
            content: record.content,
            parent_id: record.parent_id,
            child_ids: Vec::new(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Whole-store snapshot exchanged with the persistence collaborator.
///
/// Live records are kept apart from the history because a move changes the
/// live parent without producing a new version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Live record of every topic.
    pub topics: Vec<TopicRecord>,
    /// Every historical snapshot of every topic.
    pub versions: Vec<TopicRecord>,
}

// ---------------------------------------------------------------------------
// Input payloads
// ---------------------------------------------------------------------------

/// Input for creating a topic.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTopic {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<TopicId>,
}

impl NewTopic {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            parent_id: None,
        }
    }

    /// Place the new topic under `parent_id`.
    pub fn under(mut self, parent_id: TopicId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Input for producing a new version. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl TopicUpdate {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            name: None,
            content: Some(content.into()),
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Collect the violated rules for a topic name.
fn name_violations(name: &str, violations: &mut Vec<String>) {
    if name.trim().is_empty() {
        violations.push("Name must not be empty".to_string());
    }
    let len = name.chars().count();
    if len > MAX_NAME_LENGTH {
        violations.push(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters, got {len}"
        ));
    }
}

/// Collect the violated rules for topic content.
fn content_violations(content: &str, violations: &mut Vec<String>) {
    if content.trim().is_empty() {
        violations.push("Content must not be empty".to_string());
    }
    let len = content.chars().count();
    if len > MAX_CONTENT_LENGTH {
        violations.push(format!(
            "Content must be at most {MAX_CONTENT_LENGTH} characters, got {len}"
        ));
    }
}

/// Validate both fields at once, reporting every violated rule.
pub fn validate_fields(name: &str, content: &str) -> Result<(), CoreError> {
    let mut violations = Vec::new();
    name_violations(name, &mut violations);
    content_violations(content, &mut violations);
    into_result(violations)
}

fn into_result(violations: Vec<String>) -> Result<(), CoreError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(violations))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
