use clap::Subcommand;
use lekotek_core::LendingEngine;

use crate::common::{load_data, open_store, print_json, save_data, CliResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Add a cleanup session window (HH:MM times, same-day)
    Add {
        name: String,
        start_time: String,
        end_time: String,
    },
    /// List configured sessions and timing settings
    List,
    /// Remove a session
    Remove { session_id: String },
    /// Enable a session
    Enable { session_id: String },
    /// Disable a session without deleting it
    Disable { session_id: String },
    /// Minutes before session end during which borrowing is blocked
    SetWarning { minutes: u32 },
    /// Minutes after session end before loans are flagged
    SetDelay { minutes: u32 },
}

pub fn run(action: SessionAction) -> CliResult {
    let store = open_store()?;
    let mut engine = LendingEngine::new(load_data(&store)?);

    match action {
        SessionAction::Add { name, start_time, end_time } => {
            let id = engine.add_session(&name, &start_time, &end_time)?;
            save_data(&store, engine.data())?;
            println!("{id}");
        }
        SessionAction::List => {
            print_json(&engine.data().timer_settings)?;
        }
        SessionAction::Remove { session_id } => {
            engine.remove_session(&session_id)?;
            save_data(&store, engine.data())?;
        }
        SessionAction::Enable { session_id } => {
            engine.set_session_enabled(&session_id, true)?;
            save_data(&store, engine.data())?;
        }
        SessionAction::Disable { session_id } => {
            engine.set_session_enabled(&session_id, false)?;
            save_data(&store, engine.data())?;
        }
        SessionAction::SetWarning { minutes } => {
            engine.set_warning_minutes(minutes);
            save_data(&store, engine.data())?;
        }
        SessionAction::SetDelay { minutes } => {
            engine.set_delay_minutes(minutes);
            save_data(&store, engine.data())?;
        }
    }
    Ok(())
}
