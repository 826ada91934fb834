//! File-based Session Storage Adapter
//!
//! Stores one YAML file per scope under `{base}/{project_id}/{kind}.yaml`.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! reader never sees a half-written record.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::guest::{SessionScope, StoredSessionRecord};
use crate::ports::{SessionStorage, SessionStorageError};

/// File-based storage for guest session records
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    base_path: PathBuf,
}

impl FileSessionStorage {
    /// Create a new file storage with a base directory
    ///
    /// ```ignore
    /// let storage = FileSessionStorage::new("./data/guest-sessions");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn project_dir(&self, scope: &SessionScope) -> PathBuf {
        self.base_path.join(scope.project_id.to_string())
    }

    fn record_path(&self, scope: &SessionScope) -> PathBuf {
        self.project_dir(scope)
            .join(format!("{}.yaml", scope.kind.as_str()))
    }

    fn temp_path(&self, scope: &SessionScope) -> PathBuf {
        self.project_dir(scope)
            .join(format!(".{}.yaml.tmp", scope.kind.as_str()))
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(
        &self,
        scope: &SessionScope,
    ) -> Result<Option<StoredSessionRecord>, SessionStorageError> {
        let path = self.record_path(scope);

        let yaml = match fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionStorageError::IoError(e.to_string())),
        };

        let record = serde_yaml::from_str(&yaml)
            .map_err(|e| SessionStorageError::DeserializationFailed(e.to_string()))?;

        Ok(Some(record))
    }

    async fn save(
        &self,
        scope: &SessionScope,
        record: &StoredSessionRecord,
    ) -> Result<(), SessionStorageError> {
        fs::create_dir_all(self.project_dir(scope))
            .await
            .map_err(|e| SessionStorageError::IoError(e.to_string()))?;

        let yaml = serde_yaml::to_string(record)
            .map_err(|e| SessionStorageError::SerializationFailed(e.to_string()))?;

        let temp = self.temp_path(scope);
        fs::write(&temp, yaml)
            .await
            .map_err(|e| SessionStorageError::IoError(e.to_string()))?;
        fs::rename(&temp, self.record_path(scope))
            .await
            .map_err(|e| SessionStorageError::IoError(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, scope: &SessionScope) -> Result<(), SessionStorageError> {
        match fs::remove_file(self.record_path(scope)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionStorageError::IoError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{GuestId, ProjectId};
    use crate::domain::guest::{SessionKind, VerificationStatus};
    use tempfile::TempDir;

    fn scope(kind: SessionKind) -> SessionScope {
        SessionScope::new(ProjectId::new(123), kind)
    }

    fn record(token: &str) -> StoredSessionRecord {
        StoredSessionRecord {
            token: token.to_string(),
            display_name: "Stored Guest".to_string(),
            guest_id: Some(GuestId::new(77)),
            verification_status: Some(VerificationStatus::Pending),
        }
    }

    #[tokio::test]
    async fn save_and_load_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path());

        storage.save(&scope(SessionKind::Share), &record("tok")).await.unwrap();

        let loaded = storage.load(&scope(SessionKind::Share)).await.unwrap();
        assert_eq!(loaded, Some(record("tok")));
        assert!(dir.path().join("123").join("share.yaml").exists());
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path());

        assert_eq!(storage.load(&scope(SessionKind::Code)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_replaces_previous_record() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path());

        storage.save(&scope(SessionKind::Share), &record("old")).await.unwrap();
        storage.save(&scope(SessionKind::Share), &record("new")).await.unwrap();

        let loaded = storage.load(&scope(SessionKind::Share)).await.unwrap().unwrap();
        assert_eq!(loaded.token, "new");
        assert!(!dir.path().join("123").join(".share.yaml.tmp").exists());
    }

    #[tokio::test]
    async fn remove_deletes_only_its_scope() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path());

        storage.save(&scope(SessionKind::Share), &record("share")).await.unwrap();
        storage.save(&scope(SessionKind::Code), &record("code")).await.unwrap();

        storage.remove(&scope(SessionKind::Share)).await.unwrap();

        assert_eq!(storage.load(&scope(SessionKind::Share)).await.unwrap(), None);
        assert!(storage.load(&scope(SessionKind::Code)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_missing_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path());

        assert!(storage.remove(&scope(SessionKind::Share)).await.is_ok());
    }

    #[tokio::test]
    async fn corrupt_file_reports_deserialization_error() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        std::fs::create_dir_all(dir.path().join("123")).unwrap();
        std::fs::write(dir.path().join("123").join("share.yaml"), "token: [unclosed").unwrap();

        let result = storage.load(&scope(SessionKind::Share)).await;
        assert!(matches!(
            result,
            Err(SessionStorageError::DeserializationFailed(_))
        ));
    }
}
