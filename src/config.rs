// Configuration loaded from YAML

use crate::history::HISTORY_LIMIT;
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage};
use crate::task::MAX_CHARS;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CONFIG_FILENAME: &str = "checklist.yml";
const DB_FILENAME: &str = "checklist.db";

/// Which storage backend holds the persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum task text length, in characters
    pub max_chars: usize,
    /// Entries retained on each of the undo and redo stacks
    pub history_limit: usize,
    pub storage: StorageKind,
    /// Defaults to the platform data directory
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_chars: MAX_CHARS,
            history_limit: HISTORY_LIMIT,
            storage: StorageKind::default(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `checklist.yml` in the
    /// default data directory is used if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = default_data_dir().join(CONFIG_FILENAME);
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    debug!(path = ?default_path, "No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        info!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(eyre!("max_chars must be greater than zero"));
        }
        if self.history_limit == 0 {
            return Err(eyre!("history_limit must be greater than zero"));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Open the configured storage backend
    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStorage>> {
        let storage: Box<dyn KeyValueStorage> = match self.storage {
            StorageKind::File => Box::new(FileStorage::open(self.data_dir())?),
            StorageKind::Sqlite => Box::new(SqliteStorage::open(self.data_dir().join(DB_FILENAME))?),
            StorageKind::Memory => Box::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}

/// Per-user data directory, falling back to the home directory
pub fn default_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("checklist")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".checklist")
    } else {
        PathBuf::from(".checklist")
    }
}
