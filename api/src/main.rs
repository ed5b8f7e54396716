use api::routes::routes;
use api::state::AppState;
use axum::Router;
use common::{config::Config, logger::init_logger};
use services::{
    AttendanceRecorder, InMemoryTimetable, JsonlStore, RotationConfig, SessionManager,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    let config = Config::init(".env");
    init_logger(&config.log_level, &config.log_file);

    let timetable = match InMemoryTimetable::from_json_file(&config.timetable_file) {
        Ok(t) => {
            log::info!(
                "loaded {} timetable entries from {}",
                t.len(),
                config.timetable_file
            );
            t
        }
        Err(err) => {
            log::warn!(
                "could not load timetable from {}: {err}; starting with an empty timetable",
                config.timetable_file
            );
            InMemoryTimetable::default()
        }
    };

    let rotation = RotationConfig {
        default_rotation_seconds: config.rotation_seconds,
        grace_seconds: config.grace_seconds,
        min_rotation_seconds: config.min_rotation_seconds,
        max_rotation_seconds: config.max_rotation_seconds,
        max_session_lifetime: (config.max_session_minutes > 0)
            .then(|| Duration::from_secs(config.max_session_minutes * 60)),
    };

    let manager = SessionManager::new(Arc::new(timetable), rotation);
    let recorder = AttendanceRecorder::with_store(
        manager.clone(),
        Arc::new(JsonlStore::new(config.attendance_log_file.as_str())),
    );
    let app_state = AppState::new(manager, recorder);

    let cors = CorsLayer::very_permissive();
    let app = Router::new().nest("/api", routes(app_state)).layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    log::info!("Starting {} on http://{addr}", config.project_name);

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Server crashed");
}
