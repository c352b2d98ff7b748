//! Weekly statistics.
//!
//! Both counter families are keyed by ISO-8601 week (nearest-Thursday
//! rule, via chrono). Aggregates are maintained incrementally as side
//! effects of borrow/return/detector actions and are never recomputed
//! from history.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::model::{
    NotReturnedRecord, NotReturnedWeekStats, PaxWeekPoints, ReasonEntry, StudentWeekStats,
};

/// ISO week key for a date: `(iso_year, week_number)`.
///
/// The year is the ISO year, not the calendar year: 2023-01-01 belongs
/// to week 52 of 2022.
pub fn iso_week(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

fn week_points_entry(points: &mut Vec<PaxWeekPoints>, date: NaiveDate) -> &mut PaxWeekPoints {
    let (year, week) = iso_week(date);
    let idx = points
        .iter()
        .position(|p| p.year == year && p.week_number == week)
        .unwrap_or_else(|| {
            points.push(PaxWeekPoints::new(year, week));
            points.len() - 1
        });
    &mut points[idx]
}

pub fn record_borrow(points: &mut Vec<PaxWeekPoints>, class_name: &str, date: NaiveDate) {
    let entry = week_points_entry(points, date);
    *entry.class_borrows.entry(class_name.to_string()).or_insert(0) += 1;
}

pub fn record_return(points: &mut Vec<PaxWeekPoints>, class_name: &str, date: NaiveDate) {
    let entry = week_points_entry(points, date);
    *entry.class_returns.entry(class_name.to_string()).or_insert(0) += 1;
}

pub fn award_point(points: &mut Vec<PaxWeekPoints>, class_name: &str, date: NaiveDate) {
    let entry = week_points_entry(points, date);
    *entry.class_points.entry(class_name.to_string()).or_insert(0) += 1;
}

pub fn week_points_for(points: &[PaxWeekPoints], year: i32, week: u32) -> Option<&PaxWeekPoints> {
    points.iter().find(|p| p.year == year && p.week_number == week)
}

/// Returns clamped to borrows for display. The engine does not enforce
/// `returns <= borrows`; manual edits or imports can violate it.
pub fn clamped_returns(week: &PaxWeekPoints, class_name: &str) -> u32 {
    let borrows = week.class_borrows.get(class_name).copied().unwrap_or(0);
    let returns = week.class_returns.get(class_name).copied().unwrap_or(0);
    returns.min(borrows)
}

fn student_stats_entry<'a>(
    stats: &'a mut Vec<NotReturnedWeekStats>,
    record: &NotReturnedRecord,
    date: NaiveDate,
) -> &'a mut StudentWeekStats {
    let (year, week) = iso_week(date);
    let idx = stats
        .iter()
        .position(|s| s.year == year && s.week_number == week)
        .unwrap_or_else(|| {
            stats.push(NotReturnedWeekStats::new(year, week));
            stats.len() - 1
        });
    stats[idx]
        .student_stats
        .entry(record.student_id.clone())
        .or_insert_with(|| StudentWeekStats {
            student_name: record.student_name.clone(),
            class_name: record.class_name.clone(),
            count: 0,
            reasons: Vec::new(),
        })
}

/// Log a new incident: bump the student's count for this week and
/// append a reason entry. Called on the first reason assignment.
pub fn add_incident(
    stats: &mut Vec<NotReturnedWeekStats>,
    record: &NotReturnedRecord,
    now: NaiveDateTime,
) {
    let Some(reason) = record.reason else { return };
    let entry = student_stats_entry(stats, record, now.date());
    entry.count += 1;
    entry.reasons.push(ReasonEntry {
        reason,
        stolen_by: record.stolen_by.clone(),
        other_reason: record.other_reason.clone(),
        timestamp: now,
    });
}

/// Edit the latest logged incident in place. Called when the reason or
/// its detail fields change after the first assignment; the count does
/// not grow, so detail edits are not double-counted as new incidents.
///
/// Falls back to [`add_incident`] if the week rolled over and there is
/// nothing to edit yet.
pub fn update_incident(
    stats: &mut Vec<NotReturnedWeekStats>,
    record: &NotReturnedRecord,
    now: NaiveDateTime,
) {
    let Some(reason) = record.reason else { return };
    let (year, week) = iso_week(now.date());
    let existing = stats
        .iter_mut()
        .find(|s| s.year == year && s.week_number == week)
        .and_then(|s| s.student_stats.get_mut(&record.student_id));
    match existing {
        Some(entry) if !entry.reasons.is_empty() => {
            let last = entry.reasons.last_mut().unwrap();
            last.reason = reason;
            last.stolen_by = record.stolen_by.clone();
            last.other_reason = record.other_reason.clone();
        }
        _ => add_incident(stats, record, now),
    }
}

pub fn week_stats_for(
    stats: &[NotReturnedWeekStats],
    year: i32,
    week: u32,
) -> Option<&NotReturnedWeekStats> {
    stats.iter().find(|s| s.year == year && s.week_number == week)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NotReturnedReason;

    fn record(student_id: &str, reason: Option<NotReturnedReason>) -> NotReturnedRecord {
        NotReturnedRecord {
            id: format!("{student_id}-1"),
            student_id: student_id.into(),
            student_name: "Elev 1".into(),
            class_name: "Klass 1".into(),
            session_end_time: "10:10".into(),
            session_name: Some("Rast 1".into()),
            checked_at: date(2024, 1, 8).and_hms_opt(10, 40, 0).unwrap(),
            borrowed_items: Vec::new(),
            reason,
            stolen_by: None,
            other_reason: None,
            blocked_from_borrowing: true,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn iso_week_nearest_thursday_rule() {
        // 2024-01-01 is a Monday: week 1 of 2024.
        assert_eq!(iso_week(date(2024, 1, 1)), (2024, 1));
        // 2023-01-01 is a Sunday: week 52 of 2022.
        assert_eq!(iso_week(date(2023, 1, 1)), (2022, 52));
    }

    #[test]
    fn borrow_and_return_counters_upsert_by_week() {
        let mut points = Vec::new();
        let monday = date(2024, 1, 1);
        record_borrow(&mut points, "Klass 1", monday);
        record_borrow(&mut points, "Klass 1", monday);
        record_return(&mut points, "Klass 1", monday);
        // Next week gets its own entry.
        record_borrow(&mut points, "Klass 1", date(2024, 1, 8));

        assert_eq!(points.len(), 2);
        let week1 = week_points_for(&points, 2024, 1).unwrap();
        assert_eq!(week1.class_borrows["Klass 1"], 2);
        assert_eq!(week1.class_returns["Klass 1"], 1);
    }

    #[test]
    fn clamp_caps_returns_at_borrows() {
        let mut week = PaxWeekPoints::new(2024, 1);
        week.class_borrows.insert("Klass 1".into(), 2);
        week.class_returns.insert("Klass 1".into(), 5);
        assert_eq!(clamped_returns(&week, "Klass 1"), 2);
        assert_eq!(clamped_returns(&week, "Klass 2"), 0);
    }

    #[test]
    fn add_then_update_does_not_double_count() {
        let mut stats = Vec::new();
        let now = date(2024, 1, 8).and_hms_opt(11, 0, 0).unwrap();

        let mut rec = record("student-1", Some(NotReturnedReason::Lost));
        add_incident(&mut stats, &rec, now);

        // Staff edits the reason: same incident, updated in place.
        rec.reason = Some(NotReturnedReason::Stolen);
        rec.stolen_by = Some("okänd".into());
        update_incident(&mut stats, &rec, now);

        let entry = &week_stats_for(&stats, 2024, 2).unwrap().student_stats["student-1"];
        assert_eq!(entry.count, 1);
        assert_eq!(entry.reasons.len(), 1);
        assert_eq!(entry.reasons[0].reason, NotReturnedReason::Stolen);
        assert_eq!(entry.reasons[0].stolen_by.as_deref(), Some("okänd"));
    }

    #[test]
    fn update_without_prior_entry_falls_back_to_add() {
        let mut stats = Vec::new();
        let rec = record("student-1", Some(NotReturnedReason::Refused));
        update_incident(&mut stats, &rec, date(2024, 1, 8).and_hms_opt(11, 0, 0).unwrap());
        let entry = &week_stats_for(&stats, 2024, 2).unwrap().student_stats["student-1"];
        assert_eq!(entry.count, 1);
    }

    #[test]
    fn incident_without_reason_is_ignored() {
        let mut stats = Vec::new();
        let rec = record("student-1", None);
        add_incident(&mut stats, &rec, date(2024, 1, 8).and_hms_opt(11, 0, 0).unwrap());
        assert!(stats.is_empty());
    }
}
