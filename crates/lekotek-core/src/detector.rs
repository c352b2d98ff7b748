//! Not-returned detector.
//!
//! Each enabled session has one check time: its end plus the
//! configured grace delay. The detector computes the single nearest
//! future check across all sessions; the caller (the CLI `watch`
//! loop) sleeps until then, fires [`run_check`] and recomputes. There
//! is no self-rescheduling and nothing to cancel - every relevant
//! state change simply re-evaluates [`next_check`].

use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta};

use crate::clock;
use crate::events::Event;
use crate::model::{AppData, CleaningSession, LoanSummary, NotReturnedRecord, TimerSettings};

/// The next armed check: when, and for which session.
#[derive(Debug, Clone)]
pub struct CheckPoint {
    pub at: NaiveDateTime,
    pub session: CleaningSession,
}

/// Check time of `session` anchored on `date`. Rolls into the next
/// day when end time plus delay crosses midnight. `None` when the
/// session's times are malformed.
fn check_time_on(
    session: &CleaningSession,
    date: NaiveDate,
    delay_minutes: u32,
) -> Option<NaiveDateTime> {
    let end = clock::parse_hhmm(&session.end_time).ok()?;
    date.and_time(end)
        .checked_add_signed(TimeDelta::minutes(i64::from(delay_minutes)))
}

/// The single nearest future check time across all enabled sessions:
/// today's if it has not passed yet, otherwise tomorrow's.
pub fn next_check(settings: &TimerSettings, now: NaiveDateTime) -> Option<CheckPoint> {
    let mut nearest: Option<CheckPoint> = None;
    for session in settings.sessions.iter().filter(|s| s.enabled) {
        let Some(mut at) = check_time_on(session, now.date(), settings.delay_minutes) else {
            continue;
        };
        if at <= now {
            let Some(tomorrow) = at.checked_add_days(Days::new(1)) else {
                continue;
            };
            at = tomorrow;
        }
        if nearest.as_ref().map_or(true, |c| at < c.at) {
            nearest = Some(CheckPoint {
                at,
                session: session.clone(),
            });
        }
    }
    nearest
}

/// Escalate outstanding loans for one session.
///
/// Loans are grouped by student; each student without an existing
/// record gets one summarizing their items, tagged with the session
/// and blocked from further borrowing. At most one record per student.
pub fn run_check(data: &mut AppData, session: &CleaningSession, now: NaiveDateTime) -> Vec<Event> {
    if data.borrowed.is_empty() {
        return Vec::new();
    }

    // Group by student, preserving loan order.
    let mut by_student: Vec<(String, Vec<usize>)> = Vec::new();
    for (idx, item) in data.borrowed.iter().enumerate() {
        match by_student.iter_mut().find(|(id, _)| *id == item.student_id) {
            Some((_, items)) => items.push(idx),
            None => by_student.push((item.student_id.clone(), vec![idx])),
        }
    }

    let mut events = Vec::new();
    for (student_id, item_indices) in by_student {
        if data.has_not_returned_record(&student_id) {
            continue;
        }
        let first = &data.borrowed[item_indices[0]];
        let record = NotReturnedRecord {
            id: format!("{student_id}-{}", now.and_utc().timestamp_millis()),
            student_id: student_id.clone(),
            student_name: first.student_name.clone(),
            class_name: first.class_name.clone(),
            session_end_time: session.end_time.clone(),
            session_name: Some(session.name.clone()),
            checked_at: now,
            borrowed_items: item_indices
                .iter()
                .map(|&i| {
                    let item = &data.borrowed[i];
                    LoanSummary {
                        toy_id: item.toy_id.clone(),
                        toy_name: item.toy_name.clone(),
                        borrowed_at: item.borrowed_at,
                    }
                })
                .collect(),
            reason: None,
            stolen_by: None,
            other_reason: None,
            blocked_from_borrowing: true,
        };
        events.push(Event::NotReturnedFlagged {
            record_id: record.id.clone(),
            student_name: record.student_name.clone(),
            class_name: record.class_name.clone(),
            session_name: session.name.clone(),
            item_count: record.borrowed_items.len(),
            at: now,
        });
        data.not_returned.push(record);
    }
    events
}

/// Startup catch-up: fire every enabled session whose check time today
/// has already passed, in check-time order. Uses only the loans that
/// are outstanding right now.
pub fn catch_up(data: &mut AppData, now: NaiveDateTime) -> Vec<Event> {
    let delay = data.timer_settings.delay_minutes;
    let mut due: Vec<(NaiveDateTime, CleaningSession)> = data
        .timer_settings
        .sessions
        .iter()
        .filter(|s| s.enabled)
        .filter_map(|s| {
            let at = check_time_on(s, now.date(), delay)?;
            (at <= now).then(|| (at, s.clone()))
        })
        .collect();
    due.sort_by_key(|(at, _)| *at);

    let mut events = Vec::new();
    for (_, session) in due {
        events.extend(run_check(data, &session, now));
    }
    events
}
