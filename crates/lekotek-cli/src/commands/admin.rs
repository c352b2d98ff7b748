use clap::Subcommand;
use lekotek_core::LendingEngine;

use crate::common::{load_data, open_store, save_data, CliResult};

#[derive(Subcommand)]
pub enum AdminAction {
    /// Set the shared admin password
    SetPassword { password: String },
    /// Check a password against the stored one
    Verify { password: String },
}

pub fn run(action: AdminAction) -> CliResult {
    let store = open_store()?;
    let mut engine = LendingEngine::new(load_data(&store)?);

    match action {
        AdminAction::SetPassword { password } => {
            engine.set_admin_password(&password);
            save_data(&store, engine.data())?;
        }
        AdminAction::Verify { password } => {
            engine.verify_admin_password(&password)?;
            println!("ok");
        }
    }
    Ok(())
}
