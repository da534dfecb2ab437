//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GM_CART_STORAGE` - Storage backend, `file` or `memory` (default: file)
//! - `GM_CART_PATH` - Storage document for the file backend
//!   (default: .gomarketplace/storage.json)
//! - `GM_CART_KEY` - Storage key for the cart snapshot (default: @GoMarketplace:cart)
//! - `GM_LOG_FORMAT` - Log output, `pretty` or `json` (default: pretty)
//! - `RUST_LOG` - Log filter (default: go_marketplace_cart=info,go_marketplace_cli=info)

use std::path::PathBuf;
use std::sync::Arc;

use go_marketplace_cart::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage};
use thiserror::Error;

const DEFAULT_STORAGE_PATH: &str = ".gomarketplace/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the cart snapshot is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON document on disk.
    File(PathBuf),
    /// Process memory; nothing survives the command.
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Storage backend for the cart snapshot
    pub storage: StorageBackend,
    /// Storage key the snapshot lives under
    pub cart_key: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable holds an unsupported value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let storage = match get_or("GM_CART_STORAGE", "file").to_lowercase().as_str() {
            "file" => StorageBackend::File(PathBuf::from(get_or(
                "GM_CART_PATH",
                DEFAULT_STORAGE_PATH,
            ))),
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "GM_CART_STORAGE".to_string(),
                    format!("expected 'file' or 'memory', got '{other}'"),
                ));
            }
        };

        let cart_key = get_or("GM_CART_KEY", CART_STORAGE_KEY);
        if cart_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "GM_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let log_format = match get_or("GM_LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "GM_LOG_FORMAT".to_string(),
                    format!("expected 'pretty' or 'json', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            storage,
            cart_key,
            log_format,
        })
    }

    /// Build the storage backend this configuration names.
    #[must_use]
    pub fn open_storage(&self) -> Arc<dyn CartStorage> {
        match &self.storage {
            StorageBackend::File(path) => Arc::new(FileStorage::new(path)),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CliConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::File(PathBuf::from(DEFAULT_STORAGE_PATH))
        );
        assert_eq!(config.cart_key, "@GoMarketplace:cart");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_memory_backend_and_json_logs() {
        let config = load(&[("GM_CART_STORAGE", "Memory"), ("GM_LOG_FORMAT", "json")]).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_custom_path_and_key() {
        let config = load(&[("GM_CART_PATH", "/tmp/cart.json"), ("GM_CART_KEY", "k")]).unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::File(PathBuf::from("/tmp/cart.json"))
        );
        assert_eq!(config.cart_key, "k");
    }

    #[test]
    fn test_invalid_backend() {
        let err = load(&[("GM_CART_STORAGE", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref var, _) if var == "GM_CART_STORAGE"));
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(load(&[("GM_CART_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        assert!(load(&[("GM_LOG_FORMAT", "xml")]).is_err());
    }
}
