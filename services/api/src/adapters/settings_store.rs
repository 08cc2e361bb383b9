//! services/api/src/adapters/settings_store.rs
//!
//! Persistence for user settings (saved API key, preferred model).

use async_trait::async_trait;
use auramind_core::ports::{PortError, PortResult, SettingsStore};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Keeps settings in a flat JSON object on disk.
///
/// The file is read on every lookup so edits made outside the process are picked up.
/// Saves go to a sibling temp file that is renamed over the original, and readers
/// are held off while a save is in progress.
pub struct FileSettingsStore {
    path: PathBuf,
    temp_path: PathBuf,
    lock: RwLock<()>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp_path = path.clone().into_os_string();
        temp_path.push(".tmp");
        Self {
            path,
            temp_path: PathBuf::from(temp_path),
            lock: RwLock::new(()),
        }
    }

    async fn read_file(&self) -> PortResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(format!(
                "Failed to read settings file {:?}: {}",
                self.path, e
            ))),
        }
    }

    fn parse(contents: &str) -> Result<HashMap<String, String>, serde_json::Error> {
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(contents)
    }

    async fn load(&self) -> PortResult<HashMap<String, String>> {
        match self.read_file().await? {
            None => Ok(HashMap::new()),
            Some(contents) => Self::parse(&contents).map_err(|e| {
                warn!("Settings file {:?} is not valid JSON: {}", self.path, e);
                PortError::Unexpected(format!("Corrupt settings file: {}", e))
            }),
        }
    }

    /// Like `load`, but a file that is not valid JSON starts over empty.
    /// Read failures are still errors so a saved key is never clobbered.
    async fn load_for_update(&self) -> PortResult<HashMap<String, String>> {
        match self.read_file().await? {
            None => Ok(HashMap::new()),
            Some(contents) => Ok(Self::parse(&contents).unwrap_or_else(|e| {
                warn!("Replacing corrupt settings file {:?}: {}", self.path, e);
                HashMap::new()
            })),
        }
    }

    async fn write_atomically(&self, contents: String) -> PortResult<()> {
        let io_error = |e: std::io::Error| PortError::Unexpected(e.to_string());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }
        tokio::fs::write(&self.temp_path, contents)
            .await
            .map_err(io_error)?;
        tokio::fs::rename(&self.temp_path, &self.path)
            .await
            .map_err(io_error)
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let _guard = self.lock.read().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let _guard = self.lock.write().await;
        let mut values = self.load_for_update().await?;
        values.insert(key.to_string(), value.to_string());

        let contents = serde_json::to_string_pretty(&values)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.write_atomically(contents).await?;
        debug!("Persisted setting '{}' to {:?}", key, self.path);
        Ok(())
    }
}

/// Process-local settings, lost on restart.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
