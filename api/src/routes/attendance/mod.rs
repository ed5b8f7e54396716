use crate::state::AppState;
use axum::{Router, routing::post};

mod post;

pub use post::{ScanReq, ScanResponse, scan};

/// The student-facing scan endpoint.
pub fn attendance_routes() -> Router<AppState> {
    Router::new().route("/scan", post(scan))
}
