use crate::errors::TrackerError;
use crate::models::Activity;
use async_trait::async_trait;
use std::{path::Path, path::PathBuf};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

/// One JSON document holding the whole activity list.
///
/// `write` replaces the document in a single step; callers never observe a
/// half-written list.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn read(&self) -> Result<Vec<Activity>, TrackerError>;
    async fn write(&self, activities: &[Activity]) -> Result<(), TrackerError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "activities.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ActivityStore for JsonFileStore {
    async fn read(&self) -> Result<Vec<Activity>, TrackerError> {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(activities) => Ok(activities),
                Err(err) => {
                    error!(path = %self.path.display(), "failed to parse activities file: {err}");
                    Ok(Vec::new())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => {
                error!(path = %self.path.display(), "failed to read activities file: {err}");
                Err(TrackerError::storage(err))
            }
        }
    }

    async fn write(&self, activities: &[Activity]) -> Result<(), TrackerError> {
        let payload = serde_json::to_vec_pretty(activities).map_err(TrackerError::storage)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(TrackerError::storage)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, payload).await.map_err(TrackerError::storage)?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(TrackerError::storage)?;
        debug!(path = %self.path.display(), count = activities.len(), "activities persisted");
        Ok(())
    }
}

/// Document kept in process memory. `set_unavailable(true)` makes every call
/// fail with `StorageUnavailable`, like a browser with storage disabled.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
    unavailable: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(raw.into())),
            unavailable: Default::default(),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable
            .store(unavailable, std::sync::atomic::Ordering::SeqCst);
    }

    pub async fn raw(&self) -> Option<String> {
        self.document.lock().await.clone()
    }

    fn check_available(&self) -> Result<(), TrackerError> {
        if self.unavailable.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(TrackerError::StorageUnavailable(
                "storage is disabled".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn read(&self) -> Result<Vec<Activity>, TrackerError> {
        self.check_available()?;
        let document = self.document.lock().await;
        let Some(raw) = document.as_deref() else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(raw) {
            Ok(activities) => Ok(activities),
            Err(err) => {
                error!("failed to parse stored activities: {err}");
                Ok(Vec::new())
            }
        }
    }

    async fn write(&self, activities: &[Activity]) -> Result<(), TrackerError> {
        self.check_available()?;
        let payload = serde_json::to_string(activities).map_err(TrackerError::storage)?;
        *self.document.lock().await = Some(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Vec<Activity> {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        vec![
            Activity::new("Gym", "18:00", day),
            Activity::new("Read", "21:30", day),
        ]
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/data/activities.json"));
        let activities = sample();
        store.write(&activities).await.unwrap();

        assert_eq!(store.read().await.unwrap(), activities);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = JsonFileStore::new(path);
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_path_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the document should be cannot be read as a file.
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(
            store.read().await,
            Err(TrackerError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn document_is_a_plain_json_array() {
        let store = MemoryStore::new();
        store.write(&sample()).await.unwrap();
        let raw = store.raw().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["completionDate"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn corrupt_memory_document_reads_as_empty() {
        let store = MemoryStore::with_raw("[{\"description\":");
        assert!(store.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_memory_store_fails_both_ways() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.read().await,
            Err(TrackerError::StorageUnavailable(_))
        ));
        assert!(matches!(
            store.write(&sample()).await,
            Err(TrackerError::StorageUnavailable(_))
        ));
    }
}
