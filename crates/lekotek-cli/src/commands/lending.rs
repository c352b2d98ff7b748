//! Borrow/return commands plus the clock-driven `status`, `check` and
//! `watch` entry points.

use std::time::Duration;

use lekotek_core::{clock, detector, LendingEngine, SessionClock};

use crate::common::{load_data, open_store, print_json, save_data, CliResult};

pub fn borrow(student_id: &str, toy_id: &str) -> CliResult {
    let store = open_store()?;
    let mut engine = LendingEngine::new(load_data(&store)?);
    let event = engine.borrow(student_id, toy_id)?;
    save_data(&store, engine.data())?;
    print_json(&event)
}

pub fn give_back(item_id: &str) -> CliResult {
    let store = open_store()?;
    let mut engine = LendingEngine::new(load_data(&store)?);
    let event = engine.give_back(item_id)?;
    save_data(&store, engine.data())?;
    print_json(&event)
}

pub fn status() -> CliResult {
    let store = open_store()?;
    let data = load_data(&store)?;
    let now = clock::now_local();
    let next = detector::next_check(&data.timer_settings, now).map(|c| c.at);
    let snapshot = SessionClock::new(&data.timer_settings).snapshot(now, next);
    print_json(&snapshot)
}

/// One-shot catch-up: fire every check whose time has already passed
/// today, then report the next armed deadline.
pub fn check() -> CliResult {
    let store = open_store()?;
    let mut data = load_data(&store)?;
    let now = clock::now_local();

    let events = detector::catch_up(&mut data, now);
    if !events.is_empty() {
        save_data(&store, &data)?;
    }
    for event in &events {
        print_json(event)?;
    }

    let snapshot = SessionClock::new(&data.timer_settings)
        .snapshot(now, detector::next_check(&data.timer_settings, now).map(|c| c.at));
    print_json(&snapshot)
}

/// 1 Hz polling loop. Each tick re-reads the blob, recomputes the one
/// authoritative next deadline and fires it when crossed - settings or
/// loan changes made by other invocations rearm it automatically.
pub fn watch() -> CliResult {
    let store = open_store()?;

    // Catch up on checks missed while nothing was running. Only the
    // loans outstanding right now are considered.
    let mut data = load_data(&store)?;
    let mut last = clock::now_local();
    let events = detector::catch_up(&mut data, last);
    if !events.is_empty() {
        save_data(&store, &data)?;
        for event in &events {
            print_json(event)?;
        }
    }

    loop {
        std::thread::sleep(Duration::from_secs(1));
        let now = clock::now_local();
        let mut data = load_data(&store)?;
        if let Some(check) = detector::next_check(&data.timer_settings, last) {
            if check.at <= now {
                let events = detector::run_check(&mut data, &check.session, now);
                if !events.is_empty() {
                    save_data(&store, &data)?;
                }
                for event in &events {
                    print_json(event)?;
                }
            }
        }
        last = now;
    }
}
