use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "lekotek-cli", version, about = "Lekotek toy-lending CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Borrow a toy for a student
    Borrow {
        student_id: String,
        toy_id: String,
    },
    /// Return a borrowed item
    Return {
        item_id: String,
    },
    /// Print the current session clock state as JSON
    Status,
    /// Run the not-returned catch-up check once
    Check,
    /// Poll the clock and fire not-returned checks as they come due
    Watch,
    /// Toy inventory management
    Toy {
        #[command(subcommand)]
        action: commands::toy::ToyAction,
    },
    /// Class and student management
    Class {
        #[command(subcommand)]
        action: commands::class::ClassAction,
    },
    /// Cleanup session windows and timing settings
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Weekly statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Not-returned records
    NotReturned {
        #[command(subcommand)]
        action: commands::not_returned::NotReturnedAction,
    },
    /// Export and import the full data set
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Admin password management
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Borrow { student_id, toy_id } => commands::lending::borrow(&student_id, &toy_id),
        Commands::Return { item_id } => commands::lending::give_back(&item_id),
        Commands::Status => commands::lending::status(),
        Commands::Check => commands::lending::check(),
        Commands::Watch => commands::lending::watch(),
        Commands::Toy { action } => commands::toy::run(action),
        Commands::Class { action } => commands::class::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::NotReturned { action } => commands::not_returned::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Admin { action } => commands::admin::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
