//! Storage Adapters
//!
//! Implementations of the SessionStorage port for persisting guest session records.
//!
//! ## Available Adapters
//!
//! - **FileSessionStorage** - Stores one YAML file per scope on disk
//! - **InMemorySessionStorage** - Stores records in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileSessionStorage, InMemorySessionStorage};
//!
//! // Production: file-based storage
//! let storage = FileSessionStorage::new("./data/guest-sessions");
//!
//! // Testing: in-memory storage
//! let storage = InMemorySessionStorage::new();
//! ```

mod file_session_storage;
mod in_memory_session_storage;

pub use file_session_storage::FileSessionStorage;
pub use in_memory_session_storage::InMemorySessionStorage;
