//! Offline settings and validation.
//!
//! Pure configuration types. Environment overrides are applied explicitly by
//! the composition root through [`OfflineSettings::apply_env_overrides`].

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::paths::{DATA_DIR_ENV, PathError, data_root};

/// Default storage budget: 120 GiB.
pub const DEFAULT_MAX_STORAGE_BYTES: u64 = 120 * 1024 * 1024 * 1024;

/// Default number of upcoming tracks cached during playback.
pub const DEFAULT_OPPORTUNISTIC_LIMIT: usize = 5;

const MAX_OPPORTUNISTIC_LIMIT: usize = 50;

const MAX_STORAGE_ENV: &str = "HOARD_MAX_STORAGE_BYTES";
const SERVER_URL_ENV: &str = "HOARD_SERVER_URL";
const TOKEN_ENV: &str = "HOARD_TOKEN";

/// Offline download settings.
///
/// All fields are optional; `effective_*` accessors apply defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OfflineSettings {
    /// Storage budget for completed tracks, in bytes.
    pub max_storage_bytes: Option<u64>,

    /// Upcoming tracks to cache opportunistically (0-50).
    pub opportunistic_limit: Option<usize>,

    /// Data root override.
    pub data_dir: Option<String>,

    /// Media server base URL used by the HTTP downloader.
    pub server_url: Option<String>,

    /// Access token for the media server.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl OfflineSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            max_storage_bytes: Some(DEFAULT_MAX_STORAGE_BYTES),
            opportunistic_limit: Some(DEFAULT_OPPORTUNISTIC_LIMIT),
            data_dir: None,
            server_url: None,
            access_token: None,
        }
    }

    #[must_use]
    pub const fn effective_max_storage_bytes(&self) -> u64 {
        match self.max_storage_bytes {
            Some(bytes) => bytes,
            None => DEFAULT_MAX_STORAGE_BYTES,
        }
    }

    #[must_use]
    pub const fn effective_opportunistic_limit(&self) -> usize {
        match self.opportunistic_limit {
            Some(limit) => limit,
            None => DEFAULT_OPPORTUNISTIC_LIMIT,
        }
    }

    /// The configured data root, or the platform default.
    pub fn effective_data_root(&self) -> Result<PathBuf, PathError> {
        match self.data_dir.as_deref() {
            Some(dir) if dir.trim().is_empty() => Err(PathError::EmptyPath),
            Some(dir) => Ok(PathBuf::from(dir)),
            None => data_root(),
        }
    }

    /// Apply `HOARD_*` environment variables over the current values.
    pub fn apply_env_overrides(&mut self) -> Result<(), SettingsError> {
        if let Ok(dir) = env::var(DATA_DIR_ENV) {
            self.data_dir = Some(dir);
        }
        if let Ok(raw) = env::var(MAX_STORAGE_ENV) {
            let bytes = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| SettingsError::InvalidEnvValue {
                    key: MAX_STORAGE_ENV.to_string(),
                    value: raw.clone(),
                })?;
            self.max_storage_bytes = Some(bytes);
        }
        if let Ok(url) = env::var(SERVER_URL_ENV) {
            self.server_url = Some(url);
        }
        if let Ok(token) = env::var(TOKEN_ENV) {
            self.access_token = Some(token);
        }
        Ok(())
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Storage budget must be greater than zero")]
    ZeroStorageBudget,

    #[error("Opportunistic limit must be between 0 and 50, got {0}")]
    InvalidOpportunisticLimit(usize),

    #[error("Data directory cannot be empty")]
    EmptyDataDir,

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnvValue { key: String, value: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &OfflineSettings) -> Result<(), SettingsError> {
    if settings.max_storage_bytes == Some(0) {
        return Err(SettingsError::ZeroStorageBudget);
    }

    if let Some(limit) = settings.opportunistic_limit {
        if limit > MAX_OPPORTUNISTIC_LIMIT {
            return Err(SettingsError::InvalidOpportunisticLimit(limit));
        }
    }

    if settings
        .data_dir
        .as_ref()
        .is_some_and(|dir| dir.trim().is_empty())
    {
        return Err(SettingsError::EmptyDataDir);
    }

    Ok(())
}
