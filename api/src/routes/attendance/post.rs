use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use services::{ScanOutcome, StudentIdentity, credential};

use crate::auth::{AuthUser, Role};
use crate::response::ApiResponse;
use crate::routes::error_status;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScanReq {
    /// Raw QR payload, `sessionId::token`.
    pub qr_value: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ScanResponse {
    /// `"marked"` or `"already_marked"`; both mean the student is recorded
    /// present.
    pub status: String,
    pub subject: Option<String>,
    pub marked_at: Option<String>,
}

/// POST /api/attendance/scan
///
/// Verifies a scanned credential and commits at-most-once attendance for the
/// authenticated student. The student identity comes from the verified JWT,
/// never from the request body.
pub async fn scan(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<ScanReq>,
) -> (StatusCode, Json<ApiResponse<ScanResponse>>) {
    if claims.role != Role::Student {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Only students may mark attendance")),
        );
    }

    let Some((session_id, token)) = credential::split(body.qr_value.trim()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("Malformed QR payload")),
        );
    };

    let student = StudentIdentity {
        email: claims.sub.clone(),
        name: claims.name.clone(),
    };

    match state
        .recorder()
        .record_scan(session_id, token, &student, Utc::now())
        .await
    {
        Ok(ScanOutcome::Marked(record)) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                ScanResponse {
                    status: "marked".into(),
                    subject: Some(record.subject),
                    marked_at: Some(record.marked_at.to_rfc3339()),
                },
                "Attendance recorded",
            )),
        ),
        Ok(ScanOutcome::AlreadyMarked) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                ScanResponse {
                    status: "already_marked".into(),
                    subject: None,
                    marked_at: None,
                },
                "Attendance was already recorded for this session",
            )),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}
