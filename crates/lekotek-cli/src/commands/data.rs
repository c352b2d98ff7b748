use std::path::PathBuf;

use clap::Subcommand;
use lekotek_core::{clock, storage};
use serde::Serialize;

use crate::common::{load_data, open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write the full data set to a timestamped JSON file
    Export {
        /// Output path (defaults to ./lekotek-data-<timestamp>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge an exported JSON file into the stored data.
    /// A snapshot of the current data is backed up first.
    Import { file: PathBuf },
}

/// Import reports success or failure as a value; a malformed file is
/// not a crash.
#[derive(Serialize)]
struct ImportReport {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    summary: Option<storage::ImportSummary>,
}

pub fn run(action: DataAction) -> CliResult {
    let store = open_store()?;

    match action {
        DataAction::Export { output } => {
            let data = load_data(&store)?;
            let json = storage::export_json(&data)?;
            let path = output
                .unwrap_or_else(|| PathBuf::from(storage::export_filename(clock::now_local())));
            std::fs::write(&path, json)?;
            println!("{}", path.display());
        }
        DataAction::Import { file } => {
            let json = std::fs::read_to_string(&file)?;
            let report = match storage::import(&store, &json, clock::now_local()) {
                Ok(summary) => ImportReport {
                    success: true,
                    error: None,
                    summary: Some(summary),
                },
                Err(e) => ImportReport {
                    success: false,
                    error: Some(e.to_string()),
                    summary: None,
                },
            };
            print_json(&report)?;
        }
    }
    Ok(())
}
