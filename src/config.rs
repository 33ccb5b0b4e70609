//! Server configuration: command-line flags with environment fallbacks.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::error::StoreError;
use crate::store::{CoffeeStore, InMemoryCoffeeStore};

/// coffeehouse - versioned coffee collection over HTTP
#[derive(Parser, Debug, Clone)]
#[command(name = "coffeehouse")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "COFFEEHOUSE_BIND", default_value = "0.0.0.0:5000")]
    pub bind: String,

    /// Where coffees live: `memory`, `:memory:`, `sqlite:///<path>` or a file path
    #[arg(long, env = "DATABASE_URL", default_value = "memory")]
    pub database_url: String,

    /// Create "Coffee 1".."Coffee 3" at startup
    #[arg(long, env = "COFFEEHOUSE_SEED")]
    pub seed: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "COFFEEHOUSE_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Resolve `database_url` into a storage backend.
    pub fn storage(&self) -> Result<StorageBackend, ConfigError> {
        StorageBackend::parse(&self.database_url)
    }
}

/// Storage selected by `--database-url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map; contents vanish on exit.
    Memory,
    /// Private in-memory SQLite database.
    SqliteMemory,
    /// SQLite database file.
    Sqlite(PathBuf),
}

impl StorageBackend {
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() || url == "memory" {
            return Ok(StorageBackend::Memory);
        }
        if url == ":memory:" || url == "sqlite::memory:" {
            return Ok(StorageBackend::SqliteMemory);
        }

        if let Some(rest) = url.strip_prefix("sqlite://") {
            // sqlite:///relative.db and sqlite:////absolute.db
            let path = rest.strip_prefix('/').unwrap_or(rest);
            return match path {
                "" => Err(ConfigError::InvalidDatabaseUrl(url.to_string())),
                ":memory:" => Ok(StorageBackend::SqliteMemory),
                path => Ok(StorageBackend::Sqlite(PathBuf::from(path))),
            };
        }

        if url.contains("://") {
            return Err(ConfigError::UnsupportedDatabase(url.to_string()));
        }
        Ok(StorageBackend::Sqlite(PathBuf::from(url)))
    }

    /// Open the selected store.
    pub fn open(&self) -> Result<Arc<dyn CoffeeStore>, StoreError> {
        match self {
            StorageBackend::Memory => Ok(Arc::new(InMemoryCoffeeStore::new())),
            #[cfg(feature = "sqlite")]
            StorageBackend::SqliteMemory => {
                Ok(Arc::new(crate::store::SqliteCoffeeStore::open_in_memory()?))
            }
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite(path) => Ok(Arc::new(crate::store::SqliteCoffeeStore::open(path)?)),
            #[cfg(not(feature = "sqlite"))]
            _ => Err(StoreError::Storage(
                "built without the `sqlite` feature".into(),
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "in-memory map"),
            StorageBackend::SqliteMemory => write!(f, "sqlite (in-memory)"),
            StorageBackend::Sqlite(path) => write!(f, "sqlite ({})", path.display()),
        }
    }
}

/// Error type for configuration resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The URL names a database engine this build cannot talk to.
    UnsupportedDatabase(String),
    /// The URL is syntactically unusable.
    InvalidDatabaseUrl(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedDatabase(url) => {
                write!(f, "unsupported database url: {}", url)
            }
            ConfigError::InvalidDatabaseUrl(url) => write!(f, "invalid database url: {}", url),
        }
    }
}

impl std::error::Error for ConfigError {}
