//! Application configuration loaded from `kidsenglish.toml`.
//!
//! Every key is optional; a missing file yields the defaults. The relational
//! database URL can also come from `DATABASE_URL`, which wins over the file.

use super::database;
use crate::{
    core::backup::ImportMode,
    errors::{Error, Result},
    storage::{Backend, LocalStore, RelationalStore},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "kidsenglish.toml";

/// Current namespace of the local store.
pub const DEFAULT_NAMESPACE: &str = "KidsEnglishDB_v9";

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Where the snapshot lives
    pub storage: StorageConfig,
    /// Import behaviour
    pub import: ImportConfig,
}

/// Which storage backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON blob on disk
    #[default]
    Local,
    /// `SeaORM` tables
    Relational,
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend to open
    pub backend: BackendKind,
    /// Parent directory of the local namespaces
    pub data_dir: PathBuf,
    /// Current local namespace
    pub namespace: String,
    /// Older namespaces to copy forward from when `namespace` is empty
    pub legacy_namespaces: Vec<String>,
    /// Relational database URL (`DATABASE_URL` wins)
    pub database_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            data_dir: PathBuf::from("data"),
            namespace: DEFAULT_NAMESPACE.to_string(),
            legacy_namespaces: Vec::new(),
            database_url: None,
        }
    }
}

/// `[import]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Mode used when the CLI is not told otherwise
    pub mode: ImportMode,
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns [`Error::Config`] on invalid TOML or unknown keys.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config: {e}"),
    })
}

/// Loads configuration from `path`, falling back to defaults if the file does not exist.
///
/// # Errors
/// Returns [`Error::Config`] if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            debug!("Loaded configuration from {}", path.display());
            parse_config(&contents)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No config at {}, using defaults", path.display());
            Ok(AppConfig::default())
        }
        Err(e) => Err(Error::Config {
            message: format!("Failed to read config file {}: {e}", path.display()),
        }),
    }
}

/// Opens the configured backend, creating tables for the relational one.
#[instrument(skip(config), fields(backend = ?config.backend))]
pub async fn open_store(config: &StorageConfig) -> Result<Box<dyn Backend>> {
    match config.backend {
        BackendKind::Local => {
            let store = LocalStore::new(&config.data_dir, &config.namespace)
                .with_legacy_namespaces(&config.data_dir, config.legacy_namespaces.iter().cloned());
            info!("Using local store at {}", store.data_path().display());
            Ok(Box::new(store))
        }
        BackendKind::Relational => {
            let url = database::get_database_url(config.database_url.as_deref());
            let db = database::create_connection(&url).await?;
            database::create_tables(&db).await?;
            info!("Using relational store");
            Ok(Box::new(RelationalStore::new(db)))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::storage::StorageAdapter;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [storage]
            backend = "relational"
            data_dir = "/var/lib/kidsenglish"
            namespace = "KidsEnglishDB_v10"
            legacy_namespaces = ["KidsEnglishDB_v9"]
            database_url = "sqlite::memory:"

            [import]
            mode = "upsert"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, BackendKind::Relational);
        assert_eq!(config.storage.legacy_namespaces, vec!["KidsEnglishDB_v9"]);
        assert_eq!(config.import.mode, ImportMode::Upsert);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = parse_config("[import]\nmode = \"replace\"\n").unwrap();
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.storage.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = parse_config("[storage]\nbackend = \"cloud\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn test_open_local_store_bootstraps() -> Result<()> {
        let dir = TempDir::new()?;
        let config = StorageConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };

        let store = open_store(&config).await?;

        assert_eq!(store.load().await?.modules.len(), 1);
        assert!(dir.path().join(DEFAULT_NAMESPACE).join("root_data.json").exists());
        Ok(())
    }
}
