//! Persistence.
//!
//! The whole app state is one JSON blob behind a minimal key-value
//! [`Store`] contract. [`SqliteStore`] is the shipped backend; the
//! blob module layers load/save/export/import on top of any `Store`.

mod blob;
mod sqlite;

pub use blob::{
    backup_key, export_filename, export_json, import, load, save, ImportSummary, MAIN_KEY,
};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// Minimal key-value contract the core needs from its store.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/lekotek[-dev]/` based on LEKOTEK_ENV.
///
/// Set LEKOTEK_ENV=dev to use a development data directory.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LEKOTEK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lekotek-dev")
    } else {
        base_dir.join("lekotek")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
