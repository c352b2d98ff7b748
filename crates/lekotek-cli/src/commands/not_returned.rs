use clap::Subcommand;
use lekotek_core::{LendingEngine, NotReturnedReason};

use crate::common::{load_data, open_store, print_json, save_data, CliResult};

#[derive(Subcommand)]
pub enum NotReturnedAction {
    /// List active not-returned records
    List,
    /// Assign or change the reason on a record
    Reason {
        record_id: String,
        /// lost, refused, stolen or other
        reason: String,
        /// Who took the toy (reason: stolen)
        #[arg(long)]
        stolen_by: Option<String>,
        /// Free-text detail (reason: other)
        #[arg(long)]
        other: Option<String>,
    },
    /// Remove a record, unblocking the student. The toy's stock is not
    /// restored; run a return as well if it came back.
    Remove { record_id: String },
}

fn parse_reason(s: &str) -> Result<NotReturnedReason, Box<dyn std::error::Error>> {
    match s {
        "lost" => Ok(NotReturnedReason::Lost),
        "refused" => Ok(NotReturnedReason::Refused),
        "stolen" => Ok(NotReturnedReason::Stolen),
        "other" => Ok(NotReturnedReason::Other),
        other => Err(format!("unknown reason '{other}', expected lost/refused/stolen/other").into()),
    }
}

pub fn run(action: NotReturnedAction) -> CliResult {
    let store = open_store()?;
    let mut engine = LendingEngine::new(load_data(&store)?);

    match action {
        NotReturnedAction::List => {
            print_json(&engine.data().not_returned)?;
        }
        NotReturnedAction::Reason { record_id, reason, stolen_by, other } => {
            let reason = parse_reason(&reason)?;
            engine.set_record_reason(&record_id, reason, stolen_by, other)?;
            save_data(&store, engine.data())?;
        }
        NotReturnedAction::Remove { record_id } => {
            engine.remove_not_returned_record(&record_id)?;
            save_data(&store, engine.data())?;
        }
    }
    Ok(())
}
