use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Every state change in the system produces an Event.
/// The CLI renders them as JSON; callers may subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ItemBorrowed {
        item_id: String,
        student_name: String,
        class_name: String,
        toy_name: String,
        at: NaiveDateTime,
    },
    ItemReturned {
        item_id: String,
        student_name: String,
        class_name: String,
        toy_name: String,
        /// Whether this return earned the class a reward point.
        point_awarded: bool,
        at: NaiveDateTime,
    },
    /// The detector escalated an outstanding loan.
    NotReturnedFlagged {
        record_id: String,
        student_name: String,
        class_name: String,
        session_name: String,
        item_count: usize,
        at: NaiveDateTime,
    },
    SessionSnapshot {
        active_session: Option<String>,
        seconds_remaining: Option<i64>,
        borrowing_blocked: bool,
        /// Next not-returned check, if any session is enabled.
        next_check: Option<NaiveDateTime>,
        at: NaiveDateTime,
    },
}
