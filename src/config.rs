use crate::domain::ports::OrderStoreBox;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryOrderStore;
use std::path::PathBuf;

/// Where orders are kept between notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    InMemory,
    #[cfg(feature = "storage-rocksdb")]
    RocksDb(PathBuf),
}

impl StorageConfig {
    /// Picks the backend for an optional `--db-path`.
    ///
    /// Without the `storage-rocksdb` feature a path is ignored with a warning.
    pub fn from_db_path(db_path: Option<PathBuf>) -> Self {
        match db_path {
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => StorageConfig::RocksDb(path),
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(_) => {
                eprintln!(
                    "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
                );
                StorageConfig::InMemory
            }
            None => StorageConfig::InMemory,
        }
    }

    pub fn open(&self) -> Result<OrderStoreBox> {
        match self {
            StorageConfig::InMemory => Ok(Box::new(InMemoryOrderStore::new())),
            #[cfg(feature = "storage-rocksdb")]
            StorageConfig::RocksDb(path) => Ok(Box::new(
                crate::infrastructure::rocksdb::RocksDBStore::open(path)?,
            )),
        }
    }
}

/// Runtime configuration assembled from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub storage: StorageConfig,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub default_log_filter: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::InMemory,
            default_log_filter: "warn".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn with_db_path(mut self, db_path: Option<PathBuf>) -> Self {
        self.storage = StorageConfig::from_db_path(db_path);
        self
    }
}
