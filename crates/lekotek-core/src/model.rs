//! Data model for the lending tracker.
//!
//! Everything the app knows lives in one [`AppData`] blob that is
//! loaded, mutated and saved as a whole. Field names serialize in
//! camelCase so the export file matches the historical JSON shape.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current blob format version, written into every export.
pub const DATA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
}

/// A class owns its students; `name` is the identity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    pub students: Vec<Student>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toy {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Units currently on the shelf (not on loan).
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// An outstanding loan. Student and toy display fields are copied at
/// borrow time so later renames do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowedItem {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    #[serde(default)]
    pub class_color: Option<String>,
    pub toy_id: String,
    pub toy_name: String,
    pub toy_icon: String,
    #[serde(default)]
    pub toy_image: Option<String>,
    pub borrowed_at: NaiveDateTime,
}

/// A recurring daily cleanup window, `[start_time, end_time)` in
/// `HH:MM` wall-clock. No overnight wraparound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningSession {
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerType {
    Digital,
    Analog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSound {
    Beep,
    Bell,
    Chime,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub sessions: Vec<CleaningSession>,
    pub timer_type: TimerType,
    /// Minutes before session end during which new borrows are blocked.
    pub warning_minutes: u32,
    /// Minutes after session end before outstanding loans are flagged.
    pub delay_minutes: u32,
    pub alarm_sound: AlarmSound,
    pub alarm_volume: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            sessions: vec![
                CleaningSession {
                    id: "session-1".into(),
                    name: "Rast 1".into(),
                    start_time: "09:30".into(),
                    end_time: "10:10".into(),
                    enabled: true,
                },
                CleaningSession {
                    id: "session-2".into(),
                    name: "Rast 2".into(),
                    start_time: "11:30".into(),
                    end_time: "12:10".into(),
                    enabled: true,
                },
            ],
            timer_type: TimerType::Digital,
            warning_minutes: 15,
            delay_minutes: 30,
            alarm_sound: AlarmSound::Bell,
            alarm_volume: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotReturnedReason {
    Lost,
    Refused,
    Stolen,
    Other,
}

/// Toy summary embedded in a [`NotReturnedRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSummary {
    pub toy_id: String,
    pub toy_name: String,
    pub borrowed_at: NaiveDateTime,
}

/// One detected violation. At most one record exists per student at a
/// time; the detector skips students that already have one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotReturnedRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub class_name: String,
    pub session_end_time: String,
    #[serde(default)]
    pub session_name: Option<String>,
    pub checked_at: NaiveDateTime,
    pub borrowed_items: Vec<LoanSummary>,
    #[serde(default)]
    pub reason: Option<NotReturnedReason>,
    #[serde(default)]
    pub stolen_by: Option<String>,
    #[serde(default)]
    pub other_reason: Option<String>,
    #[serde(default = "default_true")]
    pub blocked_from_borrowing: bool,
}

fn default_true() -> bool {
    true
}

/// Per-class counters for one ISO week.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaxWeekPoints {
    pub week_number: u32,
    pub year: i32,
    #[serde(default)]
    pub class_points: HashMap<String, u32>,
    #[serde(default)]
    pub class_borrows: HashMap<String, u32>,
    #[serde(default)]
    pub class_returns: HashMap<String, u32>,
}

impl PaxWeekPoints {
    pub fn new(year: i32, week_number: u32) -> Self {
        Self {
            week_number,
            year,
            class_points: HashMap::new(),
            class_borrows: HashMap::new(),
            class_returns: HashMap::new(),
        }
    }
}

/// Reward-point dedup scope: one session on one day. Replaced whole
/// whenever the session or date changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RastTracking {
    pub session_id: String,
    pub date: NaiveDate,
    pub students_with_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonEntry {
    pub reason: NotReturnedReason,
    #[serde(default)]
    pub stolen_by: Option<String>,
    #[serde(default)]
    pub other_reason: Option<String>,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentWeekStats {
    pub student_name: String,
    pub class_name: String,
    pub count: u32,
    pub reasons: Vec<ReasonEntry>,
}

/// Per-student "not returned" incident counts for one ISO week.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotReturnedWeekStats {
    pub week_number: u32,
    pub year: i32,
    #[serde(default)]
    pub student_stats: HashMap<String, StudentWeekStats>,
}

impl NotReturnedWeekStats {
    pub fn new(year: i32, week_number: u32) -> Self {
        Self {
            week_number,
            year,
            student_stats: HashMap::new(),
        }
    }
}

/// The single persisted blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub classes: Vec<Class>,
    pub toys: Vec<Toy>,
    pub borrowed: Vec<BorrowedItem>,
    pub timer_settings: TimerSettings,
    pub pax_points: Vec<PaxWeekPoints>,
    #[serde(default)]
    pub rast_tracking: Option<RastTracking>,
    pub not_returned: Vec<NotReturnedRecord>,
    pub not_returned_stats: Vec<NotReturnedWeekStats>,
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub admin_password_set: bool,
    #[serde(default)]
    pub version: u32,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            classes: vec![
                Class {
                    name: "Klass 1".into(),
                    students: vec![
                        Student { id: "student-1".into(), name: "Elev 1".into() },
                        Student { id: "student-2".into(), name: "Elev 2".into() },
                        Student { id: "student-3".into(), name: "Elev 3".into() },
                    ],
                    color: Some("#3B82F6".into()),
                },
                Class {
                    name: "Klass 2".into(),
                    students: vec![
                        Student { id: "student-4".into(), name: "Elev 4".into() },
                        Student { id: "student-5".into(), name: "Elev 5".into() },
                        Student { id: "student-6".into(), name: "Elev 6".into() },
                    ],
                    color: Some("#10B981".into()),
                },
            ],
            toys: vec![
                Toy {
                    id: "toy-1".into(),
                    name: "Fotboll".into(),
                    icon: "\u{26bd}".into(),
                    quantity: 3,
                    image: None,
                },
                Toy {
                    id: "toy-2".into(),
                    name: "Basketboll".into(),
                    icon: "\u{1f3c0}".into(),
                    quantity: 3,
                    image: None,
                },
            ],
            borrowed: Vec::new(),
            timer_settings: TimerSettings::default(),
            pax_points: Vec::new(),
            rast_tracking: None,
            not_returned: Vec::new(),
            not_returned_stats: Vec::new(),
            admin_password: None,
            admin_password_set: false,
            version: DATA_VERSION,
        }
    }
}

impl AppData {
    /// Look up a student and the class that owns them.
    pub fn find_student(&self, student_id: &str) -> Option<(&Class, &Student)> {
        self.classes.iter().find_map(|class| {
            class
                .students
                .iter()
                .find(|s| s.id == student_id)
                .map(|s| (class, s))
        })
    }

    pub fn find_toy(&self, toy_id: &str) -> Option<&Toy> {
        self.toys.iter().find(|t| t.id == toy_id)
    }

    pub fn find_toy_mut(&mut self, toy_id: &str) -> Option<&mut Toy> {
        self.toys.iter_mut().find(|t| t.id == toy_id)
    }

    /// Does this student hold an outstanding loan?
    pub fn has_outstanding_loan(&self, student_id: &str) -> bool {
        self.borrowed.iter().any(|b| b.student_id == student_id)
    }

    /// Is this student blocked by an active not-returned record?
    pub fn is_student_blocked(&self, student_id: &str) -> bool {
        self.not_returned
            .iter()
            .any(|r| r.student_id == student_id && r.blocked_from_borrowing)
    }

    pub fn has_not_returned_record(&self, student_id: &str) -> bool {
        self.not_returned.iter().any(|r| r.student_id == student_id)
    }
}
