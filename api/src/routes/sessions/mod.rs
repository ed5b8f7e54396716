use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

mod common;
mod get;
mod post;

pub use common::{CreateSessionReq, CredentialResponse, SessionCreatedResponse, SessionDetailResponse};
pub use get::{get_attendees, get_current_token, get_session};
pub use post::{close_session, create_session};

/// Session lifecycle routes. Creation is faculty-gated; everything else is
/// gated on session ownership inside the handlers.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/token", get(get_current_token))
        .route("/{session_id}/close", post(close_session))
        .route("/{session_id}/attendees", get(get_attendees))
}
