//! TopicHub change notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`TopicEvent`]: the event envelope built from a committed
//!   [`TopicChange`](topichub_core::TopicChange).
//! - [`EventLogger`]: background subscriber that records every event
//!   through `tracing`.

pub mod bus;
pub mod logger;

pub use bus::{EventBus, TopicEvent};
pub use logger::EventLogger;
