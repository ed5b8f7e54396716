//! HTTP entry points under the `/api` namespace.
//!
//! Route groups:
//! - `/health` → liveness probe (public)
//! - `/sessions` → session lifecycle for faculty (create, close, credential,
//!   audit reads)
//! - `/attendance` → the student-facing scan endpoint
//!
//! Authentication is enforced per handler via the `AuthUser` extractor; role
//! checks live in the handlers themselves.

use crate::state::AppState;
use axum::Router;
use axum::http::StatusCode;
use services::AttendanceError;

pub mod attendance;
pub mod health;
pub mod sessions;

/// Builds the complete `/api` router with `AppState` already applied.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/sessions", sessions::session_routes())
        .nest("/attendance", attendance::attendance_routes())
        .with_state(app_state)
}

/// Maps every core error variant to a distinct HTTP status so clients can
/// render an actionable message.
pub fn error_status(err: &AttendanceError) -> StatusCode {
    match err {
        AttendanceError::NotFound => StatusCode::NOT_FOUND,
        AttendanceError::Forbidden => StatusCode::FORBIDDEN,
        AttendanceError::InvalidLecture => StatusCode::BAD_REQUEST,
        AttendanceError::AlreadyActive => StatusCode::CONFLICT,
        AttendanceError::InvalidToken => StatusCode::BAD_REQUEST,
        AttendanceError::SessionClosed => StatusCode::GONE,
    }
}
