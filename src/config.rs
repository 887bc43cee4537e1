use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Durable per-user state, persisted across IDE restarts.
///
/// `version` is the last add-on version the user has been notified about;
/// it only ever advances (the update check never rolls it back). `user_id`
/// is generated once on first run and never regenerated.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct PersistedConfig {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub user_id: String,
}

/// Configuration store interface. Injected rather than ambient, so hosts
/// and tests control where the state lives.
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage.
    fn load(&self) -> Result<PersistedConfig>;

    /// Save configuration to storage.
    fn save(&self, config: &PersistedConfig) -> Result<()>;
}

pub fn get_default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "buildmood")
        .context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    Ok(config_dir.join("buildmood.toml"))
}

/// TOML-file backed store.
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(get_default_config_path()?))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<PersistedConfig> {
        if !self.path.exists() {
            let default_config = PersistedConfig::default();
            self.save(&default_config)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config file: {}", self.path.display()))?;

        let config: PersistedConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", self.path.display()))?;

        Ok(config)
    }

    fn save(&self, config: &PersistedConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;

        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write config file: {}", self.path.display()))?;

        Ok(())
    }
}

/// In-memory store, for tests and hosts that manage persistence themselves.
#[derive(Default)]
pub struct MemoryConfigStore {
    state: Mutex<PersistedConfig>,
}

impl MemoryConfigStore {
    pub fn new(initial: PersistedConfig) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<PersistedConfig> {
        Ok(self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, config: &PersistedConfig) -> Result<()> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = config.clone();
        Ok(())
    }
}
