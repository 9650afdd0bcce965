//! Settings store — persisted API key and assistant behavior flags.
//!
//! DESIGN
//! ======
//! One JSON file (`settings.json`) holds the API key, the model id and the
//! three feature flags. Every key is optional on disk; a missing key reads
//! back as its default. The in-memory copy sits behind an `RwLock` so the
//! store can be shared as `Arc<SettingsStore>` between the session and the
//! request tasks. Writes replace the file via temp-file + rename.
//!
//! Temperature and max tokens are process tuning, not user settings. They
//! come from [`Tuning`] and are merged in by [`SettingsStore::config`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai::config::Tuning;
use crate::ai::types::{AiConfig, AiModel};

pub const SETTINGS_FILE: &str = "settings.json";
pub const APP_DIR: &str = "pocket-assist";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("settings I/O failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("settings file {path} is not valid JSON: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

impl crate::error::ErrorCode for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoConfigDir => "E_SETTINGS_NO_CONFIG_DIR",
            Self::Io { .. } => "E_SETTINGS_IO",
            Self::Parse { .. } => "E_SETTINGS_PARSE",
        }
    }
}

// =============================================================================
// ON-DISK SHAPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct StoredSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    /// Kept as a raw id so an unknown model survives a round trip untouched.
    model: String,
    context_enabled: bool,
    auto_complete_enabled: bool,
    code_review_enabled: bool,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: AiModel::default().id().to_string(),
            context_enabled: true,
            auto_complete_enabled: true,
            code_review_enabled: true,
        }
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct SettingsStore {
    /// `None` keeps everything in memory (tests, ephemeral sessions).
    path: Option<PathBuf>,
    tuning: Tuning,
    inner: RwLock<StoredSettings>,
}

impl SettingsStore {
    /// Open (or lazily create) the settings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>, tuning: Tuning) -> Result<Self, SettingsError> {
        let path = path.into();
        let stored = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| SettingsError::Parse { path: path.clone(), source })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoredSettings::default(),
            Err(source) => return Err(SettingsError::Io { path, source }),
        };
        info!(path = %path.display(), "settings loaded");
        Ok(Self { path: Some(path), tuning, inner: RwLock::new(stored) })
    }

    /// Open `settings.json` under `dir`, or under the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NoConfigDir`] if no directory is given and the
    /// platform has none, otherwise as [`SettingsStore::open`].
    pub fn open_in(dir: Option<&Path>, tuning: Tuning) -> Result<Self, SettingsError> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(SettingsError::NoConfigDir)?
                .join(APP_DIR),
        };
        Self::open(dir.join(SETTINGS_FILE), tuning)
    }

    #[must_use]
    pub fn in_memory(tuning: Tuning) -> Self {
        Self { path: None, tuning, inner: RwLock::new(StoredSettings::default()) }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The saved API key, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.read().api_key.clone()
    }

    /// Persist `api_key`. An empty key is stored as-is and treated as missing at request time.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written.
    pub fn save_api_key(&self, api_key: &str) -> Result<(), SettingsError> {
        self.update(|s| s.api_key = Some(api_key.to_string()))
    }

    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written.
    pub fn clear_api_key(&self) -> Result<(), SettingsError> {
        self.update(|s| s.api_key = None)
    }

    /// Snapshot of the current behavior flags plus process tuning.
    #[must_use]
    pub fn config(&self) -> AiConfig {
        let stored = self.read();
        let model = stored.model.parse::<AiModel>().unwrap_or_else(|_| {
            warn!(model = %stored.model, "unknown stored model; using default");
            AiModel::default()
        });
        AiConfig {
            model,
            context_enabled: stored.context_enabled,
            auto_complete_enabled: stored.auto_complete_enabled,
            code_review_enabled: stored.code_review_enabled,
            temperature: self.tuning.temperature,
            max_tokens: self.tuning.max_tokens,
        }
    }

    /// Persist the model and flags of `config`. Temperature and max tokens are not stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written.
    pub fn save_config(&self, config: &AiConfig) -> Result<(), SettingsError> {
        self.update(|s| {
            s.model = config.model.id().to_string();
            s.context_enabled = config.context_enabled;
            s.auto_complete_enabled = config.auto_complete_enabled;
            s.code_review_enabled = config.code_review_enabled;
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoredSettings> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` and write through. The lock is held across the write so
    /// concurrent updates land on disk in the order they were applied.
    fn update(&self, f: impl FnOnce(&mut StoredSettings)) -> Result<(), SettingsError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.clone();
        f(&mut next);
        if let Some(path) = &self.path {
            write_atomic(path, &next)?;
        }
        *guard = next;
        Ok(())
    }
}

fn write_atomic(path: &Path, stored: &StoredSettings) -> Result<(), SettingsError> {
    let io_err = |source: io::Error| SettingsError::Io { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let body = serde_json::to_string_pretty(stored).map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
