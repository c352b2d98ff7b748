use clap::Subcommand;
use lekotek_core::LendingEngine;

use crate::common::{load_data, open_store, print_json, save_data, CliResult};

#[derive(Subcommand)]
pub enum ToyAction {
    /// Add a toy to the inventory
    Add {
        name: String,
        /// Emoji or short label shown next to the name
        #[arg(long, default_value = "\u{1f3b2}")]
        icon: String,
        #[arg(long, default_value = "1")]
        quantity: u32,
    },
    /// List all toys with available quantities
    List,
    /// Remove a toy (outstanding loans keep their snapshot of it)
    Remove { toy_id: String },
    /// Set the available quantity directly
    SetQuantity { toy_id: String, quantity: u32 },
}

pub fn run(action: ToyAction) -> CliResult {
    let store = open_store()?;
    let mut engine = LendingEngine::new(load_data(&store)?);

    match action {
        ToyAction::Add { name, icon, quantity } => {
            let id = engine.add_toy(&name, &icon, quantity);
            save_data(&store, engine.data())?;
            println!("{id}");
        }
        ToyAction::List => {
            print_json(&engine.data().toys)?;
        }
        ToyAction::Remove { toy_id } => {
            engine.remove_toy(&toy_id)?;
            save_data(&store, engine.data())?;
        }
        ToyAction::SetQuantity { toy_id, quantity } => {
            engine.set_toy_quantity(&toy_id, quantity)?;
            save_data(&store, engine.data())?;
        }
    }
    Ok(())
}
