//! # Lekotek Core Library
//!
//! Core business logic for the Lekotek toy-lending tracker: staff
//! check toys out to students, track returns, enforce session cleanup
//! windows and record students who fail to return items. The CLI
//! binary is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Session Clock**: pure wall-clock queries over the configured
//!   cleanup windows - the caller re-evaluates whenever it needs one
//! - **Lending Engine**: validate-then-commit borrow/return mutations
//!   over the single [`AppData`] blob
//! - **Not-Returned Detector**: one authoritative next-check deadline
//!   derived from session end times plus the grace delay
//! - **Weekly Statistics**: ISO-week keyed counters maintained as
//!   side effects of borrow/return/detector actions
//! - **Storage**: a minimal key-value [`Store`] contract backed by
//!   SQLite, holding the blob plus import backups
//!
//! ## Key Components
//!
//! - [`LendingEngine`]: borrow/return and admin mutations
//! - [`SessionClock`]: window and warning-window queries
//! - [`SqliteStore`]: blob persistence
//! - [`Event`]: every state change, for the CLI to render

pub mod clock;
pub mod detector;
pub mod engine;
pub mod error;
pub mod events;
pub mod model;
pub mod stats;
pub mod storage;

pub use clock::SessionClock;
pub use engine::LendingEngine;
pub use error::{CoreError, ImportError, StorageError, ValidationError};
pub use events::Event;
pub use model::{AppData, NotReturnedReason};
pub use storage::{SqliteStore, Store};
