// Live configuration for editor bridges.
//
// Persisted form: `~/.mdpreview/config.toml`
//
// Bridges never cache a `BridgeConfig`; they ask their `ConfigSource` on every
// trigger so edits take effect on the next event.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::session::teardown::DEFAULT_TEARDOWN_DELAY;

/// Root directory for global state: `~/.mdpreview/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mdpreview"))
}

/// Path to the global config file: `~/.mdpreview/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

// ── Config model ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct BridgeConfig {
    pub preview: PreviewConfig,
    pub sync: SyncConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PreviewConfig {
    /// Push text to the preview whenever the buffer stops changing. When off,
    /// text is pushed only on save and reload.
    pub live_update: bool,
    /// Ask the preview to close when its editor is destroyed.
    pub close_preview_with_editor: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { live_update: true, close_preview_with_editor: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Sync the preview to the cursor whenever the buffer stops changing.
    pub sync_preview_on_change: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Grace period between the last preview detaching and teardown.
    pub teardown_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { teardown_delay_ms: DEFAULT_TEARDOWN_DELAY.as_millis() as u64 }
    }
}

impl SessionConfig {
    pub fn teardown_delay(&self) -> Duration {
        Duration::from_millis(self.teardown_delay_ms)
    }
}

impl BridgeConfig {
    /// Load from `~/.mdpreview/config.toml`. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        global_config_path().and_then(|p| Self::load_from(&p).ok()).unwrap_or_default()
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save to a specific path (creates parent directories).
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Sources ────────────────────────────────────────────────────────

/// Read access to the current configuration.
pub trait ConfigSource: Send + Sync {
    fn current(&self) -> BridgeConfig;
}

impl ConfigSource for BridgeConfig {
    fn current(&self) -> BridgeConfig {
        self.clone()
    }
}

/// In-memory configuration that the host updates as settings change.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<BridgeConfig>>,
}

impl SharedConfig {
    pub fn new(config: BridgeConfig) -> Self {
        Self { inner: Arc::new(RwLock::new(config)) }
    }

    pub fn replace(&self, config: BridgeConfig) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn update(&self, f: impl FnOnce(&mut BridgeConfig)) {
        f(&mut self.inner.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl ConfigSource for SharedConfig {
    fn current(&self) -> BridgeConfig {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Configuration re-read from a TOML file on every access.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.mdpreview/config.toml`, if a home directory can be determined.
    pub fn global() -> Option<Self> {
        global_config_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for ConfigFile {
    fn current(&self) -> BridgeConfig {
        match BridgeConfig::load_from(&self.path) {
            Ok(config) => config,
            Err(ConfigError::Io(error)) if error.kind() == io::ErrorKind::NotFound => {
                BridgeConfig::default()
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "falling back to default bridge config");
                BridgeConfig::default()
            }
        }
    }
}
