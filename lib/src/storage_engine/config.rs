// lib/src/storage_engine/config.rs

use std::path::PathBuf;

use serde::Deserialize;
use sled::Db;
use tracing::info;

use crate::errors::{StorageError, StorageResult};

pub const DEFAULT_DATA_DIRECTORY: &str = "./clinic_data";
pub const DEFAULT_CACHE_CAPACITY: u64 = 64 * 1024 * 1024;

/// Where and how to open the sled database.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    /// A temporary database lives in a scratch directory removed on drop.
    #[serde(default)]
    pub temporary: bool,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

fn default_cache_capacity() -> u64 {
    DEFAULT_CACHE_CAPACITY
}

impl StorageConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: false,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }

    /// An isolated throwaway database, one per caller.
    pub fn temporary() -> Self {
        Self {
            path: PathBuf::new(),
            temporary: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIRECTORY)
    }
}

/// Opens the database described by `config`.
pub fn open_sled_db(config: &StorageConfig) -> StorageResult<Db> {
    let mut sled_config = sled::Config::new().cache_capacity(config.cache_capacity);
    if config.temporary {
        sled_config = sled_config.temporary(true);
    } else {
        if config.path.as_os_str().is_empty() {
            return Err(StorageError::ConfigurationError(
                "storage path must not be empty".to_string(),
            ));
        }
        sled_config = sled_config.path(&config.path);
    }

    let db = sled_config.open().map_err(|e| {
        StorageError::DatabaseError(format!(
            "Failed to open Sled database at {:?}: {}",
            config.path, e
        ))
    })?;
    if config.temporary {
        info!("Opened temporary Sled database");
    } else {
        info!("Opened Sled database at {:?}", config.path);
    }
    Ok(db)
}
