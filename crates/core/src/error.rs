use crate::types::{TopicId, Version};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: TopicId },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Circular reference: {parent_id} is {id} or one of its descendants")]
    CircularReference { id: TopicId, parent_id: TopicId },

    #[error("Topic {id} has {child_count} child topic(s) and cannot be deleted")]
    HasChildren { id: TopicId, child_count: usize },

    #[error("Version {version} of topic {id} not found")]
    VersionNotFound { id: TopicId, version: Version },

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl CoreError {
    /// Shorthand for a `NotFound` on a topic id.
    pub fn topic_not_found(id: TopicId) -> Self {
        CoreError::NotFound { entity: "Topic", id }
    }

    /// Shorthand for a single-rule validation failure.
    pub fn validation(rule: impl Into<String>) -> Self {
        CoreError::Validation(vec![rule.into()])
    }
}
