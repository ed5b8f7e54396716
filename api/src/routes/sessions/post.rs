use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::{AuthUser, Role};
use crate::response::ApiResponse;
use crate::routes::error_status;
use crate::state::AppState;

use super::common::{CreateSessionReq, SessionCreatedResponse};

/// POST /api/sessions
///
/// Opens an attendance session for one of the caller's lectures and returns
/// the first QR payload. Fails with 400 for an unknown lecture slot and 409
/// when a session for that slot is already live.
pub async fn create_session(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(body): Json<CreateSessionReq>,
) -> (StatusCode, Json<ApiResponse<SessionCreatedResponse>>) {
    if claims.role != Role::Faculty {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error(
                "Only faculty may open attendance sessions",
            )),
        );
    }

    match state
        .manager()
        .create_session(body.lecture_key(), &claims.sub, body.rotation_seconds)
        .await
    {
        Ok(snapshot) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                SessionCreatedResponse::from(snapshot),
                "Attendance session created",
            )),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// POST /api/sessions/{session_id}/close
///
/// Ends the session. Only the owner may close; the rotation timer stops and
/// no token validates afterwards.
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    AuthUser(claims): AuthUser,
) -> (StatusCode, Json<ApiResponse<()>>) {
    match state.manager().close_session(&session_id, &claims.sub).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Attendance session closed")),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}
