use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::AttendanceError;
use crate::manager::SessionManager;

/// The durable fact that one student was credited present in one session.
/// Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub session_id: String,
    pub student_email: String,
    pub student_name: String,
    pub subject: String,
    pub marked_at: DateTime<Utc>,
}

/// Server-verified identity handed in by the auth boundary. The core never
/// trusts a client-asserted identity; this struct is only ever built from
/// validated claims.
#[derive(Debug, Clone)]
pub struct StudentIdentity {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Marked(AttendanceRecord),
    /// Not a failure: the student was credited earlier in this session.
    AlreadyMarked,
}

/// Best-effort durable mirror for attendance records. The in-memory attendee
/// set is the source of truth for idempotence; a persist failure is logged
/// and never changes the outcome a student sees.
pub trait AttendanceStore: Send + Sync {
    fn persist(&self, record: &AttendanceRecord) -> io::Result<()>;
}

/// Append-only JSON-lines file store, one record per line.
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AttendanceStore for JsonlStore {
    fn persist(&self, record: &AttendanceRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

/// Validates scanned credentials and commits at-most-once attendance.
#[derive(Clone)]
pub struct AttendanceRecorder {
    manager: SessionManager,
    store: Option<Arc<dyn AttendanceStore>>,
}

impl AttendanceRecorder {
    pub fn new(manager: SessionManager) -> Self {
        Self {
            manager,
            store: None,
        }
    }

    pub fn with_store(manager: SessionManager, store: Arc<dyn AttendanceStore>) -> Self {
        Self {
            manager,
            store: Some(store),
        }
    }

    /// Classifies the presented token against the session and, if fresh,
    /// inserts the student into the attendee set. The membership check and
    /// the insert happen under the session lock, so two racing scans by the
    /// same student produce exactly one record.
    pub async fn record_scan(
        &self,
        session_id: &str,
        presented_token: &str,
        student: &StudentIdentity,
        now: DateTime<Utc>,
    ) -> Result<ScanOutcome, AttendanceError> {
        let handle = self
            .manager
            .session_handle(session_id)
            .await
            .ok_or(AttendanceError::NotFound)?;

        let record = {
            let mut session = handle.lock().await;

            if !session.is_active() {
                return Err(AttendanceError::SessionClosed);
            }
            if !session.classify_token(presented_token, now).is_acceptable() {
                return Err(AttendanceError::InvalidToken);
            }
            if session.attendees.contains_key(&student.email) {
                return Ok(ScanOutcome::AlreadyMarked);
            }

            let record = AttendanceRecord {
                session_id: session.id.clone(),
                student_email: student.email.clone(),
                student_name: student.name.clone(),
                subject: session.lecture.subject.clone(),
                marked_at: now,
            };
            session.attendees.insert(student.email.clone(), record.clone());
            record
        };

        // mirror after the lock is released; failure must not demote the
        // already-committed outcome
        if let Some(store) = &self.store {
            if let Err(err) = store.persist(&record) {
                log::warn!(
                    "failed to mirror attendance record for {} in session {session_id}: {err}",
                    record.student_email
                );
            }
        }

        log::info!(
            "marked {} present in session {session_id} ({})",
            record.student_email,
            record.subject
        );
        Ok(ScanOutcome::Marked(record))
    }
}
