//! CLI bootstrap - the composition root.
//!
//! Settings come from defaults, then `HOARD_*` environment variables, then
//! command-line overrides. Stores are instantiated here and nowhere else.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use hoard_core::{LocalPlaybackIndex, OfflineSettings, validate_settings};
use hoard_store::{FsByteStore, JsonManifestStore};

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_root: PathBuf,
    pub settings: OfflineSettings,
}

impl CliConfig {
    /// Resolve settings, applying the environment and an optional data dir.
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        let mut settings = OfflineSettings::with_defaults();
        settings.apply_env_overrides()?;
        if let Some(dir) = data_dir {
            settings.data_dir = Some(dir.to_string_lossy().into_owned());
        }
        validate_settings(&settings)?;

        let data_root = settings.effective_data_root()?;
        Ok(Self {
            data_root,
            settings,
        })
    }
}

/// Stores and services shared by command handlers.
pub struct CliContext {
    pub config: CliConfig,
    pub manifests: Arc<JsonManifestStore>,
    pub bytes: Arc<FsByteStore>,
    pub index: LocalPlaybackIndex,
}

/// Wire the filesystem stores under the configured data root.
pub fn bootstrap(config: CliConfig) -> CliContext {
    let manifests = Arc::new(JsonManifestStore::in_data_root(&config.data_root));
    let bytes = Arc::new(FsByteStore::in_data_root(&config.data_root));
    let index = LocalPlaybackIndex::new(manifests.clone(), bytes.clone());

    tracing::debug!(data_root = %config.data_root.display(), "CLI context ready");

    CliContext {
        config,
        manifests,
        bytes,
        index,
    }
}
