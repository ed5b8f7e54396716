use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use services::{AttendanceError, AttendanceRecord, SessionSnapshot, credential};

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::error_status;
use crate::state::AppState;

use super::common::{CredentialResponse, SessionDetailResponse};

/// Loads the snapshot and enforces that the caller owns the session. Shared
/// by every owner-gated read.
async fn owned_snapshot(
    state: &AppState,
    session_id: &str,
    requester: &str,
) -> Result<SessionSnapshot, AttendanceError> {
    let snapshot = state.manager().get_session(session_id).await?;
    if snapshot.owner_email != requester {
        return Err(AttendanceError::Forbidden);
    }
    Ok(snapshot)
}

/// GET /api/sessions/{session_id}
///
/// Audit view of a session, valid for closed sessions too.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AuthUser(claims): AuthUser,
) -> (StatusCode, Json<ApiResponse<SessionDetailResponse>>) {
    match owned_snapshot(&state, &session_id, &claims.sub).await {
        Ok(snapshot) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SessionDetailResponse::from(snapshot),
                "Attendance session fetched",
            )),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// GET /api/sessions/{session_id}/token
///
/// The presenting client polls this to refresh the QR payload after each
/// rotation.
pub async fn get_current_token(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AuthUser(claims): AuthUser,
) -> (StatusCode, Json<ApiResponse<CredentialResponse>>) {
    if let Err(e) = owned_snapshot(&state, &session_id, &claims.sub).await {
        return (error_status(&e), Json(ApiResponse::error(e.to_string())));
    }

    match state.manager().current_credential(&session_id).await {
        Ok((token, issued_at)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CredentialResponse {
                    qr_value: credential::encode(&session_id, &token),
                    token,
                    token_issued_at: issued_at.to_rfc3339(),
                },
                "Current credential fetched",
            )),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// GET /api/sessions/{session_id}/attendees
///
/// The attendance records committed so far, oldest first.
pub async fn get_attendees(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AuthUser(claims): AuthUser,
) -> (StatusCode, Json<ApiResponse<Vec<AttendanceRecord>>>) {
    if let Err(e) = owned_snapshot(&state, &session_id, &claims.sub).await {
        return (error_status(&e), Json(ApiResponse::error(e.to_string())));
    }

    match state.manager().attendance(&session_id).await {
        Ok(records) => (
            StatusCode::OK,
            Json(ApiResponse::success(records, "Attendance records fetched")),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}
