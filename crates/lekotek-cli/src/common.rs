use lekotek_core::storage;
use lekotek_core::{AppData, SqliteStore};
use serde::Serialize;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_store() -> Result<SqliteStore, Box<dyn std::error::Error>> {
    Ok(SqliteStore::open()?)
}

pub fn load_data(store: &SqliteStore) -> Result<AppData, Box<dyn std::error::Error>> {
    Ok(storage::load(store)?)
}

pub fn save_data(store: &SqliteStore, data: &AppData) -> CliResult {
    storage::save(store, data)?;
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
