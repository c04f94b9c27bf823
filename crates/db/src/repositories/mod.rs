//! Repository implementations, one per storage backend.

pub mod json_file_repo;
pub mod memory_repo;

pub use json_file_repo::JsonFileRepository;
pub use memory_repo::MemoryRepository;
