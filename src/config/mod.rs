/// Configuration file loading and backend selection
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use app::{AppConfig, BackendKind, ImportConfig, StorageConfig, load_config, open_store};
