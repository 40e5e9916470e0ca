//! JSON file store for monitor settings

use crate::StorageError;
use serde_json::{Map, Value};
use settings::{Settings, SettingsDelta};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Settings document on disk
///
/// Clones share one write lock, so saves through any clone run one at a
/// time.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read stored settings
    ///
    /// Returns `Ok(None)` when nothing has been stored yet. Keys are
    /// validated like a control-surface update; invalid or missing keys
    /// keep their default value.
    pub async fn try_load(&self) -> Result<Option<Settings>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let map: Map<String, Value> = serde_json::from_slice(&bytes)?;

        let outcome = SettingsDelta::parse(&map);
        for rejected in &outcome.rejected {
            warn!("Stored setting rejected, using default: {}", rejected);
        }

        let mut settings = Settings::default();
        settings.apply(&outcome.delta);
        Ok(Some(settings))
    }

    /// Read stored settings, falling back to defaults on any problem
    pub async fn load_or_default(&self) -> Settings {
        match self.try_load().await {
            Ok(Some(settings)) => {
                info!("Loaded settings from {}", self.path.display());
                settings
            }
            Ok(None) => {
                info!("No settings at {}, using defaults", self.path.display());
                Settings::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable settings at {}: {}", self.path.display(), e);
                Settings::default()
            }
        }
    }

    /// Write settings via a temp file renamed into place
    ///
    /// Saves are serialised; the temp file is never shared between writers.
    pub async fn save(&self, settings: &Settings) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(settings)?;
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
