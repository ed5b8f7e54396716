use chrono::Local;
use colored::Colorize;
use fern::Dispatch;
use log::LevelFilter;
use std::fs::{create_dir_all, OpenOptions};
use std::path::Path;
use std::str::FromStr;

/// Sets up the global logger: colored output to stdout plus a plain append-only
/// log file. Must be called once, before anything else logs.
pub fn init_logger(log_level: &str, log_file_path: &str) {
    if let Some(parent) = Path::new(log_file_path).parent() {
        if !parent.exists() {
            create_dir_all(parent).expect("Failed to create log directory");
        }
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .expect("Cannot open log file");

    let level = LevelFilter::from_str(log_level).unwrap_or(LevelFilter::Info);

    Dispatch::new()
        .format(|out, message, record| {
            let tag = record.level().as_str();
            let tag = match record.level() {
                log::Level::Error => tag.red(),
                log::Level::Warn => tag.yellow(),
                log::Level::Info => tag.green(),
                log::Level::Debug => tag.cyan(),
                log::Level::Trace => tag.normal(),
            };

            out.finish(format_args!(
                "{} {:<5} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                tag,
                record.target(),
                message
            ))
        })
        .level(level)
        // hyper connection churn drowns out session events at debug
        .level_for("hyper", LevelFilter::Info)
        .level_for("tower_http", LevelFilter::Info)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .expect("Failed to initialize logger");
}
