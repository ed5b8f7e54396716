//! Application state shared across Axum route handlers.

use services::{AttendanceRecorder, SessionManager};

/// Central application state: the session manager owning all attendance
/// sessions and the recorder that commits scans against them. Cheap to clone;
/// both members are handles around shared state.
#[derive(Clone)]
pub struct AppState {
    manager: SessionManager,
    recorder: AttendanceRecorder,
}

impl AppState {
    pub fn new(manager: SessionManager, recorder: AttendanceRecorder) -> Self {
        Self { manager, recorder }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn recorder(&self) -> &AttendanceRecorder {
        &self.recorder
    }
}
