//! Domain core for the rotating-token attendance protocol.
//!
//! The `SessionManager` owns every attendance session and its rotation task,
//! the token module issues and classifies the short-lived credentials shown
//! in the QR code, and the `AttendanceRecorder` turns a verified scan into an
//! at-most-once attendance record. HTTP concerns live in the `api` crate.

pub mod credential;
pub mod error;
pub mod manager;
pub mod recorder;
pub mod session;
pub mod timetable;
pub mod token;

pub use error::AttendanceError;
pub use manager::{RotationConfig, SessionManager};
pub use recorder::{
    AttendanceRecord, AttendanceRecorder, AttendanceStore, JsonlStore, ScanOutcome,
    StudentIdentity,
};
pub use session::{SessionSnapshot, SessionStatus};
pub use timetable::{InMemoryTimetable, LectureKey, TimetableDirectory};
pub use token::TokenFreshness;
