//! The JSON configuration file, and the per-channel store backed by it.
//!
//! ```json
//! {
//!     "networks": { "freenode": { "channels": ["#ops"] } },
//!     "channels": {
//!         "#ops": {
//!             "boards": { "proj": "https://wekan.example.com/b/abc123" },
//!             "use-notices": false
//!         }
//!     }
//! }
//! ```
//!
//! Every section is optional.

use crate::{
    chat::channel::ChannelName,
    registry::{Boards, ConfigStore},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
    #[serde(default)]
    pub channels: BTreeMap<ChannelName, ChannelConfig>,
}

/// A network the relay should consider live, and the channels joined on it.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub channels: Vec<ChannelName>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub boards: Boards,
    #[serde(default, rename = "use-notices")]
    pub use_notices: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not access config file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = serde_json::to_string_pretty(self)?;

        fs::write(path, raw).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })
    }
}

/// Per-channel settings held in memory, written back to the config file on
/// every change when one was given.
pub struct JsonStore {
    path: Option<PathBuf>,
    config: RwLock<Config>,
}

impl JsonStore {
    pub fn new(config: Config, path: Option<PathBuf>) -> Self {
        JsonStore {
            path,
            config: RwLock::new(config),
        }
    }

    /// A store which never touches disk.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        JsonStore::new(Config::default(), None)
    }
}

impl ConfigStore for JsonStore {
    fn boards(&self, channel: &ChannelName) -> Option<Boards> {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);

        config.channels.get(channel).map(|c| c.boards.clone())
    }

    fn set_boards(&self, channel: &ChannelName, boards: Boards) -> Result<(), ConfigError> {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);

        let mut updated = config.clone();
        updated.channels.entry(channel.clone()).or_default().boards = boards;

        // Only take the new value once it's safely on disk.
        if let Some(path) = &self.path {
            debug!("Writing config to {}", path.display());
            updated.save(path)?;
        }

        *config = updated;
        Ok(())
    }

    fn use_notices(&self, channel: &ChannelName) -> bool {
        let config = self.config.read().unwrap_or_else(PoisonError::into_inner);

        config
            .channels
            .get(channel)
            .map(|c| c.use_notices)
            .unwrap_or(false)
    }
}
