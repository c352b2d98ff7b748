use clap::Subcommand;
use lekotek_core::{clock, stats};
use serde::Serialize;

use crate::common::{load_data, open_store, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Class reward points and borrow/return counts for one ISO week
    Points {
        /// ISO week number (defaults to the current week)
        #[arg(long)]
        week: Option<u32>,
        /// ISO year (defaults to the current week's year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Per-student not-returned incidents for one ISO week
    NotReturned {
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Serialize)]
struct ClassRow {
    class: String,
    points: u32,
    borrows: u32,
    /// Clamped to borrows; imports or manual edits can push raw
    /// returns above them.
    returns: u32,
}

#[derive(Serialize)]
struct PointsReport {
    year: i32,
    week: u32,
    classes: Vec<ClassRow>,
}

fn week_key(week: Option<u32>, year: Option<i32>) -> (i32, u32) {
    let (current_year, current_week) = stats::iso_week(clock::now_local().date());
    (year.unwrap_or(current_year), week.unwrap_or(current_week))
}

pub fn run(action: StatsAction) -> CliResult {
    let store = open_store()?;
    let data = load_data(&store)?;

    match action {
        StatsAction::Points { week, year } => {
            let (year, week) = week_key(week, year);
            let entry = stats::week_points_for(&data.pax_points, year, week);
            let classes = data
                .classes
                .iter()
                .map(|class| match entry {
                    Some(entry) => ClassRow {
                        class: class.name.clone(),
                        points: entry.class_points.get(&class.name).copied().unwrap_or(0),
                        borrows: entry.class_borrows.get(&class.name).copied().unwrap_or(0),
                        returns: stats::clamped_returns(entry, &class.name),
                    },
                    None => ClassRow {
                        class: class.name.clone(),
                        points: 0,
                        borrows: 0,
                        returns: 0,
                    },
                })
                .collect();
            print_json(&PointsReport { year, week, classes })?;
        }
        StatsAction::NotReturned { week, year } => {
            let (year, week) = week_key(week, year);
            match stats::week_stats_for(&data.not_returned_stats, year, week) {
                Some(entry) => print_json(entry)?,
                None => print_json(&lekotek_core::model::NotReturnedWeekStats::new(year, week))?,
            }
        }
    }
    Ok(())
}
