//! Session Storage Port - durable key-value storage for guest session records.
//!
//! Records are keyed by [`SessionScope`]. Every write replaces the record for
//! its scope and every removal deletes it, so at most one record exists per
//! (project, session kind) pair.

use async_trait::async_trait;

use crate::domain::guest::{GuestError, SessionScope, StoredSessionRecord};

/// Errors that can occur during session storage operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStorageError {
    #[error("Failed to serialize session record: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize session record: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<SessionStorageError> for GuestError {
    fn from(err: SessionStorageError) -> Self {
        GuestError::Storage(err.to_string())
    }
}

/// Port for persisting and loading guest session records
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load the record stored for a scope
    ///
    /// # Returns
    /// `None` when no record exists for the scope
    async fn load(
        &self,
        scope: &SessionScope,
    ) -> Result<Option<StoredSessionRecord>, SessionStorageError>;

    /// Replace the record stored for a scope
    async fn save(
        &self,
        scope: &SessionScope,
        record: &StoredSessionRecord,
    ) -> Result<(), SessionStorageError>;

    /// Delete the record for a scope. Removing a missing record is not an error.
    async fn remove(&self, scope: &SessionScope) -> Result<(), SessionStorageError>;
}
