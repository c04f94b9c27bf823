//! Domain core for TopicHub: versioned topic records, the hierarchy index,
//! and the graph queries that run over it.
//!
//! This crate performs no I/O. Persistence lives in `topichub-db`, change
//! notification in `topichub-events`, and the HTTP surface in `topichub-api`.

pub mod analysis;
pub mod diff;
pub mod error;
pub mod hierarchy;
pub mod path;
pub mod roles;
pub mod search;
pub mod store;
pub mod topic;
pub mod traversal;
pub mod types;

pub use error::CoreError;
pub use store::{Committed, TopicChange, TopicStore};
