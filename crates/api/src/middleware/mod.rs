//! Request extractors.
//!
//! - [`role::Caller`]: the caller's role, from the `x-topichub-role` header.

pub mod role;
