//! Session clock.
//!
//! Pure functions of [`TimerSettings`] and a wall-clock time. No
//! internal threads or timers - the caller re-evaluates whenever it
//! needs an answer (the CLI `watch` loop does so once per second).

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::error::ValidationError;
use crate::events::Event;
use crate::model::{CleaningSession, TimerSettings};

/// Local wall-clock "now", the time base for the whole system.
pub fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Parse an `HH:MM` string.
pub fn parse_hhmm(s: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| ValidationError::InvalidTime(s.to_string()))
}

/// `[start, end)` window of a session in seconds since midnight.
/// Sessions with malformed times simply never match.
fn session_window(session: &CleaningSession) -> Option<(u32, u32)> {
    let start = parse_hhmm(&session.start_time).ok()?;
    let end = parse_hhmm(&session.end_time).ok()?;
    Some((start.num_seconds_from_midnight(), end.num_seconds_from_midnight()))
}

/// Read-only view over the configured sessions.
pub struct SessionClock<'a> {
    settings: &'a TimerSettings,
}

impl<'a> SessionClock<'a> {
    pub fn new(settings: &'a TimerSettings) -> Self {
        Self { settings }
    }

    /// The first enabled session whose window contains `now`.
    ///
    /// Overlapping enabled sessions resolve by list order; there is no
    /// overnight wraparound.
    pub fn active_session(&self, now: NaiveTime) -> Option<&'a CleaningSession> {
        let now_secs = now.num_seconds_from_midnight();
        self.settings.sessions.iter().find(|session| {
            if !session.enabled {
                return false;
            }
            match session_window(session) {
                Some((start, end)) => now_secs >= start && now_secs < end,
                None => false,
            }
        })
    }

    /// Seconds until `session` ends. Negative after session end.
    pub fn seconds_remaining(&self, session: &CleaningSession, now: NaiveTime) -> i64 {
        match session_window(session) {
            Some((_, end)) => i64::from(end) - i64::from(now.num_seconds_from_midnight()),
            None => 0,
        }
    }

    /// True iff a session is active and its remaining time is within
    /// the warning window. Returns stay allowed; only borrows stop.
    pub fn is_borrowing_blocked(&self, now: NaiveTime) -> bool {
        match self.active_session(now) {
            Some(session) => {
                self.seconds_remaining(session, now)
                    <= i64::from(self.settings.warning_minutes) * 60
            }
            None => false,
        }
    }

    /// Full clock state as an event, for the CLI `status` command.
    pub fn snapshot(&self, now: NaiveDateTime, next_check: Option<NaiveDateTime>) -> Event {
        let active = self.active_session(now.time());
        Event::SessionSnapshot {
            active_session: active.map(|s| s.name.clone()),
            seconds_remaining: active.map(|s| self.seconds_remaining(s, now.time())),
            borrowing_blocked: self.is_borrowing_blocked(now.time()),
            next_check,
            at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CleaningSession;

    fn t(s: &str) -> NaiveTime {
        parse_hhmm(s).unwrap()
    }

    fn session(id: &str, start: &str, end: &str, enabled: bool) -> CleaningSession {
        CleaningSession {
            id: id.into(),
            name: id.into(),
            start_time: start.into(),
            end_time: end.into(),
            enabled,
        }
    }

    fn settings(sessions: Vec<CleaningSession>, warning: u32) -> TimerSettings {
        TimerSettings {
            sessions,
            warning_minutes: warning,
            ..TimerSettings::default()
        }
    }

    #[test]
    fn window_is_half_open() {
        let s = settings(vec![session("a", "09:30", "10:10", true)], 15);
        let clock = SessionClock::new(&s);
        assert!(clock.active_session(t("09:30")).is_some());
        assert!(clock.active_session(t("10:09")).is_some());
        assert!(clock.active_session(t("10:10")).is_none());
        assert!(clock.active_session(t("09:29")).is_none());
    }

    #[test]
    fn disabled_sessions_never_match() {
        let s = settings(vec![session("a", "09:00", "17:00", false)], 15);
        let clock = SessionClock::new(&s);
        assert!(clock.active_session(t("12:00")).is_none());
        assert!(!clock.is_borrowing_blocked(t("16:50")));
    }

    #[test]
    fn overlap_resolves_by_list_order() {
        let s = settings(
            vec![
                session("first", "09:00", "12:00", true),
                session("second", "10:00", "11:00", true),
            ],
            15,
        );
        let clock = SessionClock::new(&s);
        assert_eq!(clock.active_session(t("10:30")).unwrap().id, "first");
    }

    #[test]
    fn blocked_only_inside_warning_window() {
        let s = settings(vec![session("a", "09:30", "10:10", true)], 15);
        let clock = SessionClock::new(&s);
        // 40-minute session, 15-minute warning: blocked from 09:55.
        assert!(!clock.is_borrowing_blocked(t("09:54")));
        assert!(clock.is_borrowing_blocked(t("09:55")));
        assert!(clock.is_borrowing_blocked(t("10:09")));
        // Outside any window nothing is blocked.
        assert!(!clock.is_borrowing_blocked(t("10:10")));
        assert!(!clock.is_borrowing_blocked(t("08:00")));
    }

    #[test]
    fn seconds_remaining_goes_negative_after_end() {
        let s = settings(vec![session("a", "09:30", "10:10", true)], 15);
        let clock = SessionClock::new(&s);
        let sess = &s.sessions[0];
        assert_eq!(clock.seconds_remaining(sess, t("10:00")), 600);
        assert_eq!(clock.seconds_remaining(sess, t("10:11")), -60);
    }

    #[test]
    fn malformed_times_never_match() {
        let s = settings(vec![session("a", "late", "25:99", true)], 15);
        let clock = SessionClock::new(&s);
        assert!(clock.active_session(t("12:00")).is_none());
        assert!(parse_hhmm("25:99").is_err());
        assert!(parse_hhmm("0930").is_err());
    }
}
