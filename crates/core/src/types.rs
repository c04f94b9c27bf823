/// Topic ids are random UUIDs, stable across every version of a topic.
pub type TopicId = uuid::Uuid;

/// Per-topic version number, starting at 1.
pub type Version = u32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
