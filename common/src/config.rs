use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{env, fs};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    /// Default rotation cadence for new sessions, in seconds.
    pub rotation_seconds: u64,
    /// How long the previous token stays valid after a rotation.
    pub grace_seconds: u64,
    /// Lower/upper clamp applied to requested rotation intervals.
    pub min_rotation_seconds: u64,
    pub max_rotation_seconds: u64,
    /// Sessions older than this are auto-closed. `0` disables the limit.
    pub max_session_minutes: u64,
    pub timetable_file: String,
    pub attendance_log_file: String,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    pub fn init(env_path: &str) -> &'static Self {
        dotenvy::from_filename(env_path).ok();

        CONFIG.get_or_init(|| {
            let project_name =
                env::var("PROJECT_NAME").unwrap_or_else(|_| "attendance-api".into());
            let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
            let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/api.log".into());
            let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
            let port = env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000);

            if let Some(parent) = std::path::Path::new(&log_file).parent() {
                fs::create_dir_all(parent).expect("Failed to create log directory");
            }

            let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
            let jwt_duration_minutes = env::var("JWT_DURATION_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(60);

            let rotation_seconds = parse_or("ROTATION_SECONDS", 7);
            let grace_seconds = parse_or("GRACE_SECONDS", 3);
            let min_rotation_seconds = parse_or("MIN_ROTATION_SECONDS", 5);
            let max_rotation_seconds = parse_or("MAX_ROTATION_SECONDS", 10);
            let max_session_minutes = parse_or("MAX_SESSION_MINUTES", 0);

            let timetable_file =
                env::var("TIMETABLE_FILE").unwrap_or_else(|_| "data/timetable.json".into());
            let attendance_log_file = env::var("ATTENDANCE_LOG_FILE")
                .unwrap_or_else(|_| "data/attendance.jsonl".into());

            Config {
                project_name,
                log_level,
                log_file,
                host,
                port,
                jwt_secret,
                jwt_duration_minutes,
                rotation_seconds,
                grace_seconds,
                min_rotation_seconds,
                max_rotation_seconds,
                max_session_minutes,
                timetable_file,
                attendance_log_file,
            }
        })
    }

    pub fn get() -> &'static Self {
        CONFIG.get().expect("Config not initialized")
    }
}

fn parse_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
