//! Borrow/return engine.
//!
//! [`LendingEngine`] owns an [`AppData`] blob and applies validated
//! mutations to it. Callers load the blob, run operations, then
//! persist the result - one read-modify-write cycle per action, the
//! same contract the storage layer exposes.
//!
//! Every precondition is checked before anything is touched, so a
//! rejected operation leaves no partial state behind.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::clock::{self, SessionClock};
use crate::error::ValidationError;
use crate::events::Event;
use crate::model::{
    AppData, BorrowedItem, Class, CleaningSession, NotReturnedReason, RastTracking, Student, Toy,
};
use crate::stats;

pub struct LendingEngine {
    data: AppData,
}

impl LendingEngine {
    pub fn new(data: AppData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &AppData {
        &self.data
    }

    pub fn into_data(self) -> AppData {
        self.data
    }

    // ── Borrow / return ──────────────────────────────────────────────

    /// Borrow `toy_id` for `student_id` at the current wall-clock time.
    pub fn borrow(&mut self, student_id: &str, toy_id: &str) -> Result<Event, ValidationError> {
        self.borrow_at(student_id, toy_id, clock::now_local())
    }

    /// Preconditions, first violation wins:
    /// student exists, borrowing not blocked by the session clock,
    /// student not blocked by a not-returned record, no outstanding
    /// loan, toy exists with stock left.
    pub fn borrow_at(
        &mut self,
        student_id: &str,
        toy_id: &str,
        now: NaiveDateTime,
    ) -> Result<Event, ValidationError> {
        let (class, student) = self
            .data
            .find_student(student_id)
            .ok_or_else(|| ValidationError::UnknownStudent(student_id.to_string()))?;
        let class_name = class.name.clone();
        let class_color = class.color.clone();
        let student_name = student.name.clone();

        if SessionClock::new(&self.data.timer_settings).is_borrowing_blocked(now.time()) {
            return Err(ValidationError::BorrowingBlocked {
                warning_minutes: self.data.timer_settings.warning_minutes,
            });
        }
        if self.data.is_student_blocked(student_id) {
            return Err(ValidationError::StudentBlocked { student_name });
        }
        if self.data.has_outstanding_loan(student_id) {
            return Err(ValidationError::AlreadyBorrowed { student_name });
        }

        let toy = self
            .data
            .find_toy_mut(toy_id)
            .ok_or_else(|| ValidationError::UnknownToy(toy_id.to_string()))?;
        if toy.quantity == 0 {
            return Err(ValidationError::OutOfStock {
                toy_name: toy.name.clone(),
            });
        }
        let toy_name = toy.name.clone();
        let toy_icon = toy.icon.clone();
        let toy_image = toy.image.clone();

        // All checks passed; mutate.
        toy.quantity -= 1;

        // Epoch-millis suffix keeps ids unique across repeat loans.
        let item_id = format!(
            "{student_id}-{toy_id}-{}",
            now.and_utc().timestamp_millis()
        );
        self.data.borrowed.push(BorrowedItem {
            id: item_id.clone(),
            student_id: student_id.to_string(),
            student_name: student_name.clone(),
            class_name: class_name.clone(),
            class_color,
            toy_id: toy_id.to_string(),
            toy_name: toy_name.clone(),
            toy_icon,
            toy_image,
            borrowed_at: now,
        });
        stats::record_borrow(&mut self.data.pax_points, &class_name, now.date());

        Ok(Event::ItemBorrowed {
            item_id,
            student_name,
            class_name,
            toy_name,
            at: now,
        })
    }

    /// Return a borrowed item at the current wall-clock time.
    pub fn give_back(&mut self, item_id: &str) -> Result<Event, ValidationError> {
        self.give_back_at(item_id, clock::now_local())
    }

    /// Restores toy stock, removes the loan, counts the return for the
    /// class's week and awards a reward point when the return happens
    /// during an active session (at most one per student per session
    /// per day).
    pub fn give_back_at(
        &mut self,
        item_id: &str,
        now: NaiveDateTime,
    ) -> Result<Event, ValidationError> {
        let idx = self
            .data
            .borrowed
            .iter()
            .position(|b| b.id == item_id)
            .ok_or_else(|| ValidationError::UnknownItem(item_id.to_string()))?;
        let item = self.data.borrowed.remove(idx);

        // The toy may have been deleted while on loan; then there is
        // no stock to restore.
        if let Some(toy) = self.data.find_toy_mut(&item.toy_id) {
            toy.quantity += 1;
        }

        stats::record_return(&mut self.data.pax_points, &item.class_name, now.date());
        let point_awarded = self.maybe_award_point(&item.student_id, &item.class_name, now);

        Ok(Event::ItemReturned {
            item_id: item.id,
            student_name: item.student_name,
            class_name: item.class_name,
            toy_name: item.toy_name,
            point_awarded,
            at: now,
        })
    }

    /// Reward-point dedup: the tracking slate is scoped to one session
    /// on one day and replaced whenever either changes.
    fn maybe_award_point(&mut self, student_id: &str, class_name: &str, now: NaiveDateTime) -> bool {
        let session_id = match SessionClock::new(&self.data.timer_settings)
            .active_session(now.time())
        {
            Some(session) => session.id.clone(),
            None => return false,
        };
        let today = now.date();

        let mut tracking = match self.data.rast_tracking.take() {
            Some(t) if t.session_id == session_id && t.date == today => t,
            _ => RastTracking {
                session_id,
                date: today,
                students_with_points: Vec::new(),
            },
        };

        let awarded = if tracking.students_with_points.iter().any(|s| s == student_id) {
            false
        } else {
            tracking.students_with_points.push(student_id.to_string());
            stats::award_point(&mut self.data.pax_points, class_name, today);
            true
        };
        self.data.rast_tracking = Some(tracking);
        awarded
    }

    // ── Toy administration ───────────────────────────────────────────

    pub fn add_toy(&mut self, name: &str, icon: &str, quantity: u32) -> String {
        let id = Uuid::new_v4().to_string();
        self.data.toys.push(Toy {
            id: id.clone(),
            name: name.to_string(),
            icon: icon.to_string(),
            quantity,
            image: None,
        });
        id
    }

    pub fn remove_toy(&mut self, toy_id: &str) -> Result<(), ValidationError> {
        if self.data.find_toy(toy_id).is_none() {
            return Err(ValidationError::UnknownToy(toy_id.to_string()));
        }
        self.data.toys.retain(|t| t.id != toy_id);
        Ok(())
    }

    pub fn set_toy_quantity(&mut self, toy_id: &str, quantity: u32) -> Result<(), ValidationError> {
        let toy = self
            .data
            .find_toy_mut(toy_id)
            .ok_or_else(|| ValidationError::UnknownToy(toy_id.to_string()))?;
        toy.quantity = quantity;
        Ok(())
    }

    // ── Class administration ─────────────────────────────────────────

    pub fn add_class(&mut self, name: &str, color: Option<String>) -> Result<(), ValidationError> {
        if self.data.classes.iter().any(|c| c.name == name) {
            return Err(ValidationError::DuplicateClass(name.to_string()));
        }
        self.data.classes.push(Class {
            name: name.to_string(),
            students: Vec::new(),
            color,
        });
        Ok(())
    }

    pub fn remove_class(&mut self, name: &str) -> Result<(), ValidationError> {
        if !self.data.classes.iter().any(|c| c.name == name) {
            return Err(ValidationError::UnknownClass(name.to_string()));
        }
        self.data.classes.retain(|c| c.name != name);
        Ok(())
    }

    pub fn add_student(&mut self, class_name: &str, name: &str) -> Result<String, ValidationError> {
        let class = self
            .data
            .classes
            .iter_mut()
            .find(|c| c.name == class_name)
            .ok_or_else(|| ValidationError::UnknownClass(class_name.to_string()))?;
        let id = Uuid::new_v4().to_string();
        class.students.push(Student {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(id)
    }

    /// Identity is immutable; only the name can change. Loan history
    /// keeps the name it was recorded under.
    pub fn rename_student(&mut self, student_id: &str, name: &str) -> Result<(), ValidationError> {
        for class in &mut self.data.classes {
            if let Some(student) = class.students.iter_mut().find(|s| s.id == student_id) {
                student.name = name.to_string();
                return Ok(());
            }
        }
        Err(ValidationError::UnknownStudent(student_id.to_string()))
    }

    pub fn remove_student(&mut self, student_id: &str) -> Result<(), ValidationError> {
        for class in &mut self.data.classes {
            if class.students.iter().any(|s| s.id == student_id) {
                class.students.retain(|s| s.id != student_id);
                return Ok(());
            }
        }
        Err(ValidationError::UnknownStudent(student_id.to_string()))
    }

    // ── Session administration ───────────────────────────────────────

    /// Windows must be well-formed and same-day (`end > start`).
    /// Overlap with other sessions is allowed and resolves by order.
    pub fn add_session(
        &mut self,
        name: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<String, ValidationError> {
        let start = clock::parse_hhmm(start_time)?;
        let end = clock::parse_hhmm(end_time)?;
        if end <= start {
            return Err(ValidationError::InvalidTimeRange {
                start: start_time.to_string(),
                end: end_time.to_string(),
            });
        }
        let id = Uuid::new_v4().to_string();
        self.data.timer_settings.sessions.push(CleaningSession {
            id: id.clone(),
            name: name.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            enabled: true,
        });
        Ok(id)
    }

    pub fn remove_session(&mut self, session_id: &str) -> Result<(), ValidationError> {
        let sessions = &mut self.data.timer_settings.sessions;
        if !sessions.iter().any(|s| s.id == session_id) {
            return Err(ValidationError::UnknownSession(session_id.to_string()));
        }
        sessions.retain(|s| s.id != session_id);
        Ok(())
    }

    pub fn set_session_enabled(
        &mut self,
        session_id: &str,
        enabled: bool,
    ) -> Result<(), ValidationError> {
        let session = self
            .data
            .timer_settings
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| ValidationError::UnknownSession(session_id.to_string()))?;
        session.enabled = enabled;
        Ok(())
    }

    pub fn set_warning_minutes(&mut self, minutes: u32) {
        self.data.timer_settings.warning_minutes = minutes;
    }

    pub fn set_delay_minutes(&mut self, minutes: u32) {
        self.data.timer_settings.delay_minutes = minutes;
    }

    // ── Not-returned records ─────────────────────────────────────────

    /// Remove a record, unblocking the student. Stock is not restored;
    /// pair with a return action if the toy came back.
    pub fn remove_not_returned_record(&mut self, record_id: &str) -> Result<(), ValidationError> {
        if !self.data.not_returned.iter().any(|r| r.id == record_id) {
            return Err(ValidationError::UnknownRecord(record_id.to_string()));
        }
        self.data.not_returned.retain(|r| r.id != record_id);
        Ok(())
    }

    pub fn set_record_reason(
        &mut self,
        record_id: &str,
        reason: NotReturnedReason,
        stolen_by: Option<String>,
        other_reason: Option<String>,
    ) -> Result<(), ValidationError> {
        self.set_record_reason_at(record_id, reason, stolen_by, other_reason, clock::now_local())
    }

    /// Assign or edit the reason on a record. The first assignment
    /// logs an incident into the weekly stats; later edits update that
    /// incident in place instead of logging a new one.
    pub fn set_record_reason_at(
        &mut self,
        record_id: &str,
        reason: NotReturnedReason,
        stolen_by: Option<String>,
        other_reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<(), ValidationError> {
        let record = self
            .data
            .not_returned
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| ValidationError::UnknownRecord(record_id.to_string()))?;

        let first_assignment = record.reason.is_none();
        record.reason = Some(reason);
        record.stolen_by = if reason == NotReturnedReason::Stolen {
            stolen_by
        } else {
            None
        };
        record.other_reason = if reason == NotReturnedReason::Other {
            other_reason
        } else {
            None
        };

        let snapshot = record.clone();
        if first_assignment {
            stats::add_incident(&mut self.data.not_returned_stats, &snapshot, now);
        } else {
            stats::update_incident(&mut self.data.not_returned_stats, &snapshot, now);
        }
        Ok(())
    }

    // ── Admin password ───────────────────────────────────────────────

    pub fn set_admin_password(&mut self, password: &str) {
        self.data.admin_password = Some(password.to_string());
        self.data.admin_password_set = true;
    }

    pub fn verify_admin_password(&self, password: &str) -> Result<(), ValidationError> {
        match self.data.admin_password.as_deref() {
            Some(stored) if stored == password => Ok(()),
            _ => Err(ValidationError::InvalidPassword),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 8)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn engine() -> LendingEngine {
        // Default sessions: 09:30-10:10 and 11:30-12:10, warning 15.
        LendingEngine::new(AppData::default())
    }

    #[test]
    fn borrow_then_return_round_trips() {
        let mut engine = engine();
        assert_eq!(engine.data().find_toy("toy-1").unwrap().quantity, 3);

        let event = engine.borrow_at("student-1", "toy-1", at(13, 0)).unwrap();
        let item_id = match event {
            Event::ItemBorrowed { item_id, .. } => item_id,
            other => panic!("expected ItemBorrowed, got {other:?}"),
        };
        assert_eq!(engine.data().find_toy("toy-1").unwrap().quantity, 2);
        assert_eq!(engine.data().borrowed.len(), 1);

        engine.give_back_at(&item_id, at(13, 5)).unwrap();
        assert_eq!(engine.data().find_toy("toy-1").unwrap().quantity, 3);
        assert!(engine.data().borrowed.is_empty());
    }

    #[test]
    fn second_borrow_is_rejected() {
        let mut engine = engine();
        engine.borrow_at("student-1", "toy-1", at(13, 0)).unwrap();
        let err = engine.borrow_at("student-1", "toy-2", at(13, 1)).unwrap_err();
        assert!(matches!(err, ValidationError::AlreadyBorrowed { .. }));
        // Nothing was mutated by the rejected borrow.
        assert_eq!(engine.data().find_toy("toy-2").unwrap().quantity, 3);
        assert_eq!(engine.data().borrowed.len(), 1);
    }

    #[test]
    fn borrow_blocked_inside_warning_window() {
        let mut engine = engine();
        // 10:00 is within 15 minutes of the 10:10 session end.
        let err = engine.borrow_at("student-1", "toy-1", at(10, 0)).unwrap_err();
        assert!(matches!(err, ValidationError::BorrowingBlocked { .. }));
        // Returns still work in the warning window.
        engine.borrow_at("student-1", "toy-1", at(9, 40)).unwrap();
        let item_id = engine.data().borrowed[0].id.clone();
        engine.give_back_at(&item_id, at(10, 0)).unwrap();
        assert!(engine.data().borrowed.is_empty());
    }

    #[test]
    fn out_of_stock_is_rejected() {
        let mut engine = engine();
        engine.set_toy_quantity("toy-1", 0).unwrap();
        let err = engine.borrow_at("student-1", "toy-1", at(13, 0)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfStock { .. }));
    }

    #[test]
    fn unknown_student_and_toy_are_rejected() {
        let mut engine = engine();
        assert!(matches!(
            engine.borrow_at("nobody", "toy-1", at(13, 0)),
            Err(ValidationError::UnknownStudent(_))
        ));
        assert!(matches!(
            engine.borrow_at("student-1", "no-toy", at(13, 0)),
            Err(ValidationError::UnknownToy(_))
        ));
    }

    #[test]
    fn one_point_per_student_per_session_per_day() {
        let mut engine = engine();
        // Two returns by the same student inside the same session.
        engine.borrow_at("student-1", "toy-1", at(9, 32)).unwrap();
        let first = engine.data().borrowed[0].id.clone();
        match engine.give_back_at(&first, at(9, 40)).unwrap() {
            Event::ItemReturned { point_awarded, .. } => assert!(point_awarded),
            other => panic!("expected ItemReturned, got {other:?}"),
        }
        engine.borrow_at("student-1", "toy-1", at(9, 41)).unwrap();
        let second = engine.data().borrowed[0].id.clone();
        match engine.give_back_at(&second, at(9, 45)).unwrap() {
            Event::ItemReturned { point_awarded, .. } => assert!(!point_awarded),
            other => panic!("expected ItemReturned, got {other:?}"),
        }

        let week = stats::week_points_for(&engine.data().pax_points, 2024, 2).unwrap();
        assert_eq!(week.class_points["Klass 1"], 1);
        assert_eq!(week.class_borrows["Klass 1"], 2);
        assert_eq!(week.class_returns["Klass 1"], 2);
    }

    #[test]
    fn tracking_resets_on_new_session() {
        let mut engine = engine();
        engine.borrow_at("student-1", "toy-1", at(9, 32)).unwrap();
        let first = engine.data().borrowed[0].id.clone();
        engine.give_back_at(&first, at(9, 40)).unwrap();

        // Same student returns again during the second session.
        engine.borrow_at("student-1", "toy-1", at(10, 30)).unwrap();
        let second = engine.data().borrowed[0].id.clone();
        match engine.give_back_at(&second, at(11, 35)).unwrap() {
            Event::ItemReturned { point_awarded, .. } => assert!(point_awarded),
            other => panic!("expected ItemReturned, got {other:?}"),
        }
        let week = stats::week_points_for(&engine.data().pax_points, 2024, 2).unwrap();
        assert_eq!(week.class_points["Klass 1"], 2);
    }

    #[test]
    fn no_point_outside_sessions() {
        let mut engine = engine();
        engine.borrow_at("student-1", "toy-1", at(13, 0)).unwrap();
        let item = engine.data().borrowed[0].id.clone();
        match engine.give_back_at(&item, at(13, 10)).unwrap() {
            Event::ItemReturned { point_awarded, .. } => assert!(!point_awarded),
            other => panic!("expected ItemReturned, got {other:?}"),
        }
        let week = stats::week_points_for(&engine.data().pax_points, 2024, 2).unwrap();
        assert!(week.class_points.is_empty());
    }

    #[test]
    fn blocked_student_cannot_borrow() {
        let mut engine = engine();
        engine.data.not_returned.push(crate::model::NotReturnedRecord {
            id: "student-1-1".into(),
            student_id: "student-1".into(),
            student_name: "Elev 1".into(),
            class_name: "Klass 1".into(),
            session_end_time: "10:10".into(),
            session_name: Some("Rast 1".into()),
            checked_at: at(10, 40),
            borrowed_items: Vec::new(),
            reason: None,
            stolen_by: None,
            other_reason: None,
            blocked_from_borrowing: true,
        });
        let err = engine.borrow_at("student-1", "toy-1", at(13, 0)).unwrap_err();
        assert!(matches!(err, ValidationError::StudentBlocked { .. }));

        // Removing the record unblocks the student.
        engine.remove_not_returned_record("student-1-1").unwrap();
        engine.borrow_at("student-1", "toy-1", at(13, 0)).unwrap();
    }

    #[test]
    fn reason_edits_update_stats_in_place() {
        let mut engine = engine();
        engine.data.not_returned.push(crate::model::NotReturnedRecord {
            id: "rec-1".into(),
            student_id: "student-1".into(),
            student_name: "Elev 1".into(),
            class_name: "Klass 1".into(),
            session_end_time: "10:10".into(),
            session_name: Some("Rast 1".into()),
            checked_at: at(10, 40),
            borrowed_items: Vec::new(),
            reason: None,
            stolen_by: None,
            other_reason: None,
            blocked_from_borrowing: true,
        });

        engine
            .set_record_reason_at("rec-1", NotReturnedReason::Lost, None, None, at(11, 0))
            .unwrap();
        engine
            .set_record_reason_at(
                "rec-1",
                NotReturnedReason::Other,
                None,
                Some("glömde hemma".into()),
                at(11, 5),
            )
            .unwrap();

        let entry = &stats::week_stats_for(&engine.data().not_returned_stats, 2024, 2)
            .unwrap()
            .student_stats["student-1"];
        assert_eq!(entry.count, 1);
        assert_eq!(entry.reasons.len(), 1);
        assert_eq!(entry.reasons[0].other_reason.as_deref(), Some("glömde hemma"));
        // Switching away from stolen/other clears the detail fields.
        assert!(engine.data().not_returned[0].stolen_by.is_none());
    }

    #[test]
    fn session_validation_rejects_inverted_window() {
        let mut engine = engine();
        let err = engine.add_session("Kväll", "15:00", "14:00").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimeRange { .. }));
        assert!(engine.add_session("Kväll", "15:00", "15:45").is_ok());
    }

    #[test]
    fn admin_password_round_trip() {
        let mut engine = engine();
        assert!(engine.verify_admin_password("hemligt").is_err());
        engine.set_admin_password("hemligt");
        assert!(engine.verify_admin_password("hemligt").is_ok());
        assert!(engine.verify_admin_password("fel").is_err());
        assert!(engine.data().admin_password_set);
    }

    #[test]
    fn full_day_borrow_flag_and_resolve() {
        // toy-1 has quantity 3; student A borrows it, is refused a
        // second toy, then returns it.
        let mut engine = engine();
        engine.borrow_at("student-1", "toy-1", at(13, 0)).unwrap();
        assert_eq!(engine.data().find_toy("toy-1").unwrap().quantity, 2);
        assert_eq!(engine.data().borrowed.len(), 1);

        let err = engine.borrow_at("student-1", "toy-2", at(13, 1)).unwrap_err();
        assert!(matches!(err, ValidationError::AlreadyBorrowed { .. }));

        let item = engine.data().borrowed[0].id.clone();
        engine.give_back_at(&item, at(13, 2)).unwrap();
        assert_eq!(engine.data().find_toy("toy-1").unwrap().quantity, 3);
        assert!(engine.data().borrowed.is_empty());
    }
}
