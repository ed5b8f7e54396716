use thiserror::Error;

/// Every failure a caller of the attendance core can observe. Each variant
/// maps to a distinct client-facing status so the scanning UI can show an
/// actionable message instead of a generic error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    #[error("attendance session not found")]
    NotFound,

    #[error("only the session owner may perform this action")]
    Forbidden,

    #[error("lecture does not match any timetable entry")]
    InvalidLecture,

    #[error("an active session already exists for this lecture")]
    AlreadyActive,

    #[error("invalid or expired attendance code")]
    InvalidToken,

    #[error("attendance session is closed")]
    SessionClosed,
}
