#![allow(dead_code)]

use api::auth::{Role, generate_jwt};
use api::routes::routes;
use api::state::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use once_cell::sync::Lazy;
use serde_json::Value;
use services::{
    AttendanceRecorder, InMemoryTimetable, LectureKey, RotationConfig, SessionManager,
};
use std::sync::Arc;

static TEST_ENV: Lazy<()> = Lazy::new(|| {
    // set once before any token is generated or verified
    unsafe {
        std::env::set_var("JWT_SECRET", "attendance-test-secret");
        std::env::set_var("JWT_DURATION_MINUTES", "60");
    }
});

pub fn lecture() -> LectureKey {
    LectureKey {
        branch: "CE".into(),
        semester: 3,
        day: "Monday".into(),
        slot: 1,
        subject: "Algorithms".into(),
    }
}

pub fn other_lecture() -> LectureKey {
    LectureKey {
        branch: "CE".into(),
        semester: 3,
        day: "Monday".into(),
        slot: 2,
        subject: "Operating Systems".into(),
    }
}

/// Builds the app router with a seeded two-entry timetable and a fresh
/// in-memory session manager.
pub fn make_test_app() -> (Router, AppState) {
    Lazy::force(&TEST_ENV);

    let timetable = Arc::new(InMemoryTimetable::new([lecture(), other_lecture()]));
    let manager = SessionManager::new(timetable, RotationConfig::default());
    let recorder = AttendanceRecorder::new(manager.clone());
    let state = AppState::new(manager, recorder);
    let app = Router::new().nest("/api", routes(state.clone()));
    (app, state)
}

pub fn faculty_token(email: &str) -> String {
    generate_jwt(email, "Dr. Faculty", Role::Faculty).0
}

pub fn student_token(email: &str) -> String {
    generate_jwt(email, "Test Student", Role::Student).0
}

pub fn json_request(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn response_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn create_session_body() -> Value {
    serde_json::json!({
        "branch": "CE",
        "semester": 3,
        "day": "Monday",
        "slot": 1,
        "subject": "Algorithms",
    })
}
