//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! `ConfigStore` keeps the live snapshot so owner checks observe a reload immediately.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    pub password: String,
}

/// System-level settings for the bot.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    /// Identities allowed to run owner-only commands.
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            owners: Vec::new(),
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    #[cfg(test)]
    pub fn for_owners(owners: &[&str]) -> Self {
        Self {
            services: ServicesConfig {
                matrix: MatrixConfig {
                    homeserver: "https://example.org".to_string(),
                    username: "bot".to_string(),
                    password: "secret".to_string(),
                },
            },
            system: SystemConfig {
                owners: owners.iter().map(|o| o.to_string()).collect(),
                ..SystemConfig::default()
            },
        }
    }
}

/// Shared, reloadable view of the configuration.
#[derive(Clone)]
pub struct ConfigStore {
    path: PathBuf,
    current: Arc<RwLock<AppConfig>>,
}

impl ConfigStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = AppConfig::load(&path)?;
        Ok(Self::with_config(path, config))
    }

    pub fn with_config(path: impl Into<PathBuf>, config: AppConfig) -> Self {
        Self {
            path: path.into(),
            current: Arc::new(RwLock::new(config)),
        }
    }

    pub fn snapshot(&self) -> AppConfig {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_owner(&self, identity: &str) -> bool {
        match self.current.read() {
            Ok(guard) => guard.system.owners.iter().any(|o| o == identity),
            Err(poisoned) => poisoned.into_inner().system.owners.iter().any(|o| o == identity),
        }
    }

    /// Re-read the file. The previous snapshot stays in place when loading fails.
    pub fn reload(&self) -> Result<()> {
        let fresh = AppConfig::load(&self.path)?;
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = fresh;
        tracing::info!("Reloaded configuration from {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "services:\n  matrix:\n    homeserver: https://example.org\n    \
                        username: bot\n    password: secret\n";

    fn write_config(file: &tempfile::NamedTempFile, system: &str) {
        fs::write(file.path(), format!("{BASE}{system}")).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = serde_yaml::from_str(BASE).unwrap();
        assert_eq!(config.system.prefix, "!");
        assert!(config.system.owners.is_empty());
    }

    #[test]
    fn test_reload_swaps_owners() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_config(&file, "system:\n  owners: [\"@alice:example.org\"]\n");
        let store = ConfigStore::open(file.path()).unwrap();
        assert!(store.is_owner("@alice:example.org"));
        assert!(!store.is_owner("@bob:example.org"));

        write_config(&file, "system:\n  owners: [\"@bob:example.org\"]\n");
        store.reload().unwrap();
        assert!(store.is_owner("@bob:example.org"));
        assert!(!store.is_owner("@alice:example.org"));
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_config(&file, "system:\n  owners: [\"@alice:example.org\"]\n");
        let store = ConfigStore::open(file.path()).unwrap();

        write_config(&file, "system: [not, a, map\n");
        let err = store.reload().unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
        assert!(store.is_owner("@alice:example.org"));
    }
}
