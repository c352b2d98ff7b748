use clap::Subcommand;
use lekotek_core::LendingEngine;

use crate::common::{load_data, open_store, print_json, save_data, CliResult};

#[derive(Subcommand)]
pub enum ClassAction {
    /// Add a class
    Add {
        name: String,
        /// Display color, e.g. #3B82F6
        #[arg(long)]
        color: Option<String>,
    },
    /// List classes and their students
    List,
    /// Remove a class and its students
    Remove { name: String },
    /// Add a student to a class
    AddStudent { class_name: String, name: String },
    /// Rename a student (identity and history stay unchanged)
    RenameStudent { student_id: String, name: String },
    /// Remove a student
    RemoveStudent { student_id: String },
}

pub fn run(action: ClassAction) -> CliResult {
    let store = open_store()?;
    let mut engine = LendingEngine::new(load_data(&store)?);

    match action {
        ClassAction::Add { name, color } => {
            engine.add_class(&name, color)?;
            save_data(&store, engine.data())?;
        }
        ClassAction::List => {
            print_json(&engine.data().classes)?;
        }
        ClassAction::Remove { name } => {
            engine.remove_class(&name)?;
            save_data(&store, engine.data())?;
        }
        ClassAction::AddStudent { class_name, name } => {
            let id = engine.add_student(&class_name, &name)?;
            save_data(&store, engine.data())?;
            println!("{id}");
        }
        ClassAction::RenameStudent { student_id, name } => {
            engine.rename_student(&student_id, &name)?;
            save_data(&store, engine.data())?;
        }
        ClassAction::RemoveStudent { student_id } => {
            engine.remove_student(&student_id)?;
            save_data(&store, engine.data())?;
        }
    }
    Ok(())
}
