pub mod hierarchy;
pub mod paths;
pub mod search;
pub mod topics;
