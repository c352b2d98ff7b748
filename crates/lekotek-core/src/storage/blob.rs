//! The app-data blob on top of a [`Store`].
//!
//! Every operation is a read-modify-write of the whole blob under one
//! fixed key. Import always snapshots the current blob under a
//! timestamped backup key before merging.

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::Store;
use crate::error::{CoreError, ImportError};
use crate::model::{
    AppData, BorrowedItem, Class, NotReturnedRecord, NotReturnedWeekStats, PaxWeekPoints,
    RastTracking, TimerSettings, Toy,
};

/// Fixed key for the main blob.
pub const MAIN_KEY: &str = "lekotek_app_data";

/// Load the blob, falling back to seed defaults when the key is
/// absent or its contents are unreadable.
pub fn load(store: &dyn Store) -> Result<AppData, CoreError> {
    match store.get(MAIN_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json).unwrap_or_default()),
        None => Ok(AppData::default()),
    }
}

pub fn save(store: &dyn Store, data: &AppData) -> Result<(), CoreError> {
    let json = serde_json::to_string(data)?;
    store.put(MAIN_KEY, &json)?;
    Ok(())
}

/// Full blob as pretty JSON, for the export file.
pub fn export_json(data: &AppData) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Timestamped export filename, e.g. `lekotek-data-20240108-094500.json`.
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("lekotek-data-{}.json", now.format("%Y%m%d-%H%M%S"))
}

/// Backup key written before every import.
pub fn backup_key(now: NaiveDateTime) -> String {
    format!("lekotek-backup-{}", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// What an import did, for reporting back to the user.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ImportSummary {
    pub backup_key: String,
    pub toys_updated: usize,
    pub toys_added: usize,
    pub classes_updated: usize,
    pub classes_added: usize,
}

/// Import file shape: the AppData fields, all optional. Password
/// fields are deliberately absent - an import never touches them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportData {
    #[serde(default)]
    classes: Option<Vec<Class>>,
    #[serde(default)]
    toys: Option<Vec<Toy>>,
    #[serde(default)]
    borrowed: Option<Vec<BorrowedItem>>,
    #[serde(default)]
    timer_settings: Option<TimerSettings>,
    #[serde(default)]
    pax_points: Option<Vec<PaxWeekPoints>>,
    #[serde(default)]
    rast_tracking: Option<RastTracking>,
    #[serde(default)]
    not_returned: Option<Vec<NotReturnedRecord>>,
    #[serde(default)]
    not_returned_stats: Option<Vec<NotReturnedWeekStats>>,
}

/// Merge an exported JSON document into the stored blob.
///
/// Toys merge by `id` and classes by `name`: colliding entries take
/// the imported version, unmatched existing entries are preserved, new
/// entries are appended. The remaining collections are replaced
/// wholesale when present in the import. A full snapshot of the
/// pre-import blob is saved first under [`backup_key`].
pub fn import(store: &dyn Store, json: &str, now: NaiveDateTime) -> Result<ImportSummary, CoreError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| ImportError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(ImportError::InvalidShape.into());
    }
    let imported: ImportData = serde_json::from_value(value)
        .map_err(|e| ImportError::InvalidJson(e.to_string()))?;

    let mut data = load(store)?;

    // Snapshot before touching anything.
    let key = backup_key(now);
    store.put(&key, &export_json(&data)?)?;

    let mut summary = ImportSummary {
        backup_key: key,
        toys_updated: 0,
        toys_added: 0,
        classes_updated: 0,
        classes_added: 0,
    };

    if let Some(toys) = imported.toys {
        for existing in &mut data.toys {
            if let Some(incoming) = toys.iter().find(|t| t.id == existing.id) {
                *existing = incoming.clone();
                summary.toys_updated += 1;
            }
        }
        for incoming in toys {
            if !data.toys.iter().any(|t| t.id == incoming.id) {
                data.toys.push(incoming);
                summary.toys_added += 1;
            }
        }
    }

    if let Some(classes) = imported.classes {
        for existing in &mut data.classes {
            if let Some(incoming) = classes.iter().find(|c| c.name == existing.name) {
                *existing = incoming.clone();
                summary.classes_updated += 1;
            }
        }
        for incoming in classes {
            if !data.classes.iter().any(|c| c.name == incoming.name) {
                data.classes.push(incoming);
                summary.classes_added += 1;
            }
        }
    }

    if let Some(borrowed) = imported.borrowed {
        data.borrowed = borrowed;
    }
    if let Some(settings) = imported.timer_settings {
        data.timer_settings = settings;
    }
    if let Some(points) = imported.pax_points {
        data.pax_points = points;
    }
    if let Some(tracking) = imported.rast_tracking {
        data.rast_tracking = Some(tracking);
    }
    if let Some(records) = imported.not_returned {
        data.not_returned = records;
    }
    if let Some(stats) = imported.not_returned_stats {
        data.not_returned_stats = stats;
    }
    // admin_password / admin_password_set are never overwritten.

    save(store, &data)?;
    Ok(summary)
}
