//! In-Memory Session Storage Adapter
//!
//! Stores guest session records in memory.
//! Useful for testing and for hosts without a durable store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::guest::{SessionScope, StoredSessionRecord};
use crate::ports::{SessionStorage, SessionStorageError};

/// In-memory storage for guest session records
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStorage {
    records: Arc<RwLock<HashMap<SessionScope, StoredSessionRecord>>>,
}

impl InMemorySessionStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of stored records
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Peek at the record for a scope without going through the port
    pub async fn get(&self, scope: &SessionScope) -> Option<StoredSessionRecord> {
        self.records.read().await.get(scope).cloned()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn load(
        &self,
        scope: &SessionScope,
    ) -> Result<Option<StoredSessionRecord>, SessionStorageError> {
        Ok(self.records.read().await.get(scope).cloned())
    }

    async fn save(
        &self,
        scope: &SessionScope,
        record: &StoredSessionRecord,
    ) -> Result<(), SessionStorageError> {
        self.records.write().await.insert(*scope, record.clone());
        Ok(())
    }

    async fn remove(&self, scope: &SessionScope) -> Result<(), SessionStorageError> {
        self.records.write().await.remove(scope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ProjectId;
    use crate::domain::guest::{SessionKind, VerificationStatus};

    fn scope(project: u64, kind: SessionKind) -> SessionScope {
        SessionScope::new(ProjectId::new(project), kind)
    }

    fn record(token: &str) -> StoredSessionRecord {
        StoredSessionRecord {
            token: token.to_string(),
            display_name: "Jane".to_string(),
            guest_id: None,
            verification_status: Some(VerificationStatus::Verified),
        }
    }

    #[tokio::test]
    async fn save_and_load_record() {
        let storage = InMemorySessionStorage::new();
        let scope = scope(1, SessionKind::Share);

        storage.save(&scope, &record("a")).await.unwrap();

        let loaded = storage.load(&scope).await.unwrap();
        assert_eq!(loaded, Some(record("a")));
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let storage = InMemorySessionStorage::new();
        assert_eq!(storage.load(&scope(1, SessionKind::Code)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_replaces_existing_record_for_scope() {
        let storage = InMemorySessionStorage::new();
        let scope = scope(1, SessionKind::Share);

        storage.save(&scope, &record("first")).await.unwrap();
        storage.save(&scope, &record("second")).await.unwrap();

        assert_eq!(storage.record_count().await, 1);
        assert_eq!(storage.get(&scope).await.unwrap().token, "second");
    }

    #[tokio::test]
    async fn scopes_do_not_contend() {
        let storage = InMemorySessionStorage::new();
        storage.save(&scope(1, SessionKind::Share), &record("share")).await.unwrap();
        storage.save(&scope(1, SessionKind::Code), &record("code")).await.unwrap();
        storage.save(&scope(2, SessionKind::Share), &record("other")).await.unwrap();

        storage.remove(&scope(1, SessionKind::Share)).await.unwrap();

        assert_eq!(storage.record_count().await, 2);
        assert!(storage.get(&scope(1, SessionKind::Code)).await.is_some());
    }

    #[tokio::test]
    async fn remove_missing_is_not_an_error() {
        let storage = InMemorySessionStorage::new();
        assert!(storage.remove(&scope(5, SessionKind::Code)).await.is_ok());
    }
}
