use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::AttendanceError;
use crate::recorder::AttendanceRecord;
use crate::session::{Session, SessionId, SessionSnapshot, SessionStatus};
use crate::timetable::{LectureKey, TimetableDirectory};

/// Product parameters for token rotation. The 5-10 second clamp and the
/// grace length are deliberately configuration, not constants.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    pub default_rotation_seconds: u64,
    pub grace_seconds: u64,
    pub min_rotation_seconds: u64,
    pub max_rotation_seconds: u64,
    /// Sessions older than this are closed by their own rotation task.
    pub max_session_lifetime: Option<Duration>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            default_rotation_seconds: 7,
            grace_seconds: 3,
            min_rotation_seconds: 5,
            max_rotation_seconds: 10,
            max_session_lifetime: None,
        }
    }
}

impl RotationConfig {
    fn effective_rotation(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.default_rotation_seconds)
            .clamp(self.min_rotation_seconds, self.max_rotation_seconds)
    }

    /// Grace never exceeds half the rotation interval, which bounds the
    /// exploitable replay window regardless of configuration.
    fn effective_grace(&self, rotation_seconds: u64) -> u64 {
        self.grace_seconds.min(rotation_seconds / 2)
    }
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<SessionId, Arc<Mutex<Session>>>,
    active_by_lecture: HashMap<LectureKey, SessionId>,
}

struct Inner {
    registry: RwLock<Registry>,
    timetable: Arc<dyn TimetableDirectory>,
    config: RotationConfig,
}

/// Owns every attendance session and drives one rotation task per active
/// session. Lock order is always registry before session; rotation ticks and
/// scans only ever take the session mutex.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(timetable: Arc<dyn TimetableDirectory>, config: RotationConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(Registry::default()),
                timetable,
                config,
            }),
        }
    }

    /// Opens a session for a lecture, issues its first token, and schedules
    /// rotation. At most one session may be live per lecture occurrence.
    pub async fn create_session(
        &self,
        lecture: LectureKey,
        owner_email: &str,
        rotation_seconds: Option<u64>,
    ) -> Result<SessionSnapshot, AttendanceError> {
        if !self.inner.timetable.contains(&lecture) {
            return Err(AttendanceError::InvalidLecture);
        }

        let rotation = self.inner.config.effective_rotation(rotation_seconds);
        let grace = self.inner.config.effective_grace(rotation);

        let mut registry = self.inner.registry.write().await;
        if registry.active_by_lecture.contains_key(&lecture) {
            return Err(AttendanceError::AlreadyActive);
        }

        let session = Session::new(lecture.clone(), owner_email, rotation, grace, Utc::now());
        let id = session.id.clone();
        let snapshot = session.snapshot();
        let handle = Arc::new(Mutex::new(session));

        let task = self.spawn_rotation(id.clone(), handle.clone(), Duration::from_secs(rotation));
        handle.lock().await.rotation_task = Some(task);

        registry.sessions.insert(id.clone(), handle);
        registry.active_by_lecture.insert(lecture, id.clone());
        drop(registry);

        log::info!("attendance session {id} opened by {owner_email} (rotation {rotation}s, grace {grace}s)");
        Ok(snapshot)
    }

    /// Closes a session on behalf of its owner. Cancels the rotation task and
    /// frees the lecture slot for a future session.
    pub async fn close_session(&self, id: &str, requester: &str) -> Result<(), AttendanceError> {
        self.close_inner(id, Some(requester)).await
    }

    /// Read-only view of the live credential for the presenting client.
    pub async fn current_credential(
        &self,
        id: &str,
    ) -> Result<(String, DateTime<Utc>), AttendanceError> {
        let handle = self
            .session_handle(id)
            .await
            .ok_or(AttendanceError::NotFound)?;
        let session = handle.lock().await;
        if !session.is_active() {
            return Err(AttendanceError::SessionClosed);
        }
        Ok((session.current_token.clone(), session.current_token_issued_at))
    }

    /// Audit read; works on closed sessions too.
    pub async fn get_session(&self, id: &str) -> Result<SessionSnapshot, AttendanceError> {
        let handle = self
            .session_handle(id)
            .await
            .ok_or(AttendanceError::NotFound)?;
        let session = handle.lock().await;
        Ok(session.snapshot())
    }

    /// Attendance records for a session, oldest first. Also an audit read.
    pub async fn attendance(&self, id: &str) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let handle = self
            .session_handle(id)
            .await
            .ok_or(AttendanceError::NotFound)?;
        let session = handle.lock().await;
        let mut records: Vec<_> = session.attendees.values().cloned().collect();
        records.sort_by_key(|r| r.marked_at);
        Ok(records)
    }

    pub(crate) async fn session_handle(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.inner.registry.read().await.sessions.get(id).cloned()
    }

    async fn close_inner(
        &self,
        id: &str,
        requester: Option<&str>,
    ) -> Result<(), AttendanceError> {
        let mut registry = self.inner.registry.write().await;
        let handle = registry
            .sessions
            .get(id)
            .cloned()
            .ok_or(AttendanceError::NotFound)?;
        let mut session = handle.lock().await;

        if let Some(requester) = requester {
            if session.owner_email != requester {
                return Err(AttendanceError::Forbidden);
            }
        }
        if session.status == SessionStatus::Closed {
            return Err(AttendanceError::SessionClosed);
        }

        session.close(Utc::now());
        registry.active_by_lecture.remove(&session.lecture);
        log::info!("attendance session {id} closed");
        Ok(())
    }

    fn spawn_rotation(
        &self,
        id: SessionId,
        handle: Arc<Mutex<Session>>,
        period: Duration,
    ) -> JoinHandle<()> {
        let manager = self.clone();
        // lifetime is enforced in timer time: after this many ticks the
        // session is overdue
        let max_ticks = self
            .inner
            .config
            .max_session_lifetime
            .map(|max| (max.as_secs() / period.as_secs().max(1)).max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; the initial token was
            // already issued at creation
            ticker.tick().await;

            let mut ticks: u64 = 0;
            loop {
                ticker.tick().await;
                ticks += 1;

                if max_ticks.is_some_and(|limit| ticks > limit) {
                    match manager.close_inner(&id, None).await {
                        Ok(()) => {
                            log::info!("attendance session {id} reached its maximum lifetime")
                        }
                        Err(AttendanceError::SessionClosed) => {}
                        Err(err) => log::warn!("auto-close of session {id} failed: {err}"),
                    }
                    break;
                }

                let mut session = handle.lock().await;
                if session.status == SessionStatus::Closed {
                    break;
                }
                session.rotate(Utc::now());
                log::debug!("rotated token for session {id}");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::InMemoryTimetable;

    fn lecture() -> LectureKey {
        LectureKey {
            branch: "CE".into(),
            semester: 3,
            day: "Monday".into(),
            slot: 1,
            subject: "Algorithms".into(),
        }
    }

    fn timetable() -> Arc<InMemoryTimetable> {
        let mut other = lecture();
        other.slot = 2;
        Arc::new(InMemoryTimetable::new([lecture(), other]))
    }

    fn manager() -> SessionManager {
        SessionManager::new(timetable(), RotationConfig::default())
    }

    #[tokio::test]
    async fn create_rejects_unknown_lecture() {
        let m = manager();
        let mut bogus = lecture();
        bogus.day = "Sunday".into();

        let err = m.create_session(bogus, "lect@uni.edu", None).await;
        assert_eq!(err.unwrap_err(), AttendanceError::InvalidLecture);
    }

    #[tokio::test]
    async fn one_live_session_per_lecture() {
        let m = manager();
        m.create_session(lecture(), "lect@uni.edu", None)
            .await
            .unwrap();

        let err = m.create_session(lecture(), "lect@uni.edu", None).await;
        assert_eq!(err.unwrap_err(), AttendanceError::AlreadyActive);

        // a different slot is a different occurrence
        let mut other = lecture();
        other.slot = 2;
        m.create_session(other, "lect@uni.edu", None).await.unwrap();
    }

    #[tokio::test]
    async fn lecture_slot_frees_up_after_close() {
        let m = manager();
        let snap = m
            .create_session(lecture(), "lect@uni.edu", None)
            .await
            .unwrap();
        m.close_session(&snap.id, "lect@uni.edu").await.unwrap();

        let again = m.create_session(lecture(), "lect@uni.edu", None).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn close_requires_the_owner() {
        let m = manager();
        let snap = m
            .create_session(lecture(), "lect@uni.edu", None)
            .await
            .unwrap();

        let err = m.close_session(&snap.id, "intruder@uni.edu").await;
        assert_eq!(err.unwrap_err(), AttendanceError::Forbidden);

        m.close_session(&snap.id, "lect@uni.edu").await.unwrap();
        // closing twice reports the session as closed
        let err = m.close_session(&snap.id, "lect@uni.edu").await;
        assert_eq!(err.unwrap_err(), AttendanceError::SessionClosed);
    }

    #[tokio::test]
    async fn credential_reads_fail_once_closed() {
        let m = manager();
        let snap = m
            .create_session(lecture(), "lect@uni.edu", None)
            .await
            .unwrap();

        let (token, _) = m.current_credential(&snap.id).await.unwrap();
        assert_eq!(token, snap.current_token);

        m.close_session(&snap.id, "lect@uni.edu").await.unwrap();
        let err = m.current_credential(&snap.id).await;
        assert_eq!(err.unwrap_err(), AttendanceError::SessionClosed);

        // audit reads still work
        let audit = m.get_session(&snap.id).await.unwrap();
        assert_eq!(audit.status, SessionStatus::Closed);
        assert!(audit.closed_at.is_some());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let m = manager();
        let err = m.current_credential("feedfacefeedfacefeedfacefeedface").await;
        assert_eq!(err.unwrap_err(), AttendanceError::NotFound);
    }

    #[tokio::test]
    async fn rotation_interval_is_clamped_to_product_range() {
        let m = manager();
        let fast = m
            .create_session(lecture(), "lect@uni.edu", Some(1))
            .await
            .unwrap();
        assert_eq!(fast.rotation_seconds, 5);

        let mut other = lecture();
        other.slot = 2;
        let slow = m
            .create_session(other, "lect@uni.edu", Some(300))
            .await
            .unwrap();
        assert_eq!(slow.rotation_seconds, 10);
    }

    #[tokio::test]
    async fn grace_is_configurable_and_capped_at_half_the_interval() {
        let config = RotationConfig {
            grace_seconds: 5,
            ..RotationConfig::default()
        };
        let m = SessionManager::new(timetable(), config);

        // with a 10s interval the configured 5s grace fits exactly
        let snap = m
            .create_session(lecture(), "lect@uni.edu", Some(10))
            .await
            .unwrap();
        assert_eq!(snap.grace_seconds, 5);

        // with a 6s interval the half-interval cap binds
        let mut other = lecture();
        other.slot = 2;
        let capped = m
            .create_session(other, "lect@uni.edu", Some(6))
            .await
            .unwrap();
        assert_eq!(capped.grace_seconds, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rotation_replaces_the_token_every_interval() {
        let m = manager();
        let snap = m
            .create_session(lecture(), "lect@uni.edu", Some(5))
            .await
            .unwrap();

        let (t0, _) = m.current_credential(&snap.id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;
        let (t1, _) = m.current_credential(&snap.id).await.unwrap();
        assert_ne!(t0, t1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let (t2, _) = m.current_credential(&snap.id).await.unwrap();
        assert_ne!(t1, t2);
        assert_ne!(t0, t2);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_ticks_are_noops_after_close() {
        let m = manager();
        let snap = m
            .create_session(lecture(), "lect@uni.edu", Some(5))
            .await
            .unwrap();
        m.close_session(&snap.id, "lect@uni.edu").await.unwrap();

        tokio::time::sleep(Duration::from_secs(20)).await;

        let audit = m.get_session(&snap.id).await.unwrap();
        assert_eq!(audit.status, SessionStatus::Closed);
        // token fields were frozen at close time
        assert_eq!(audit.current_token, snap.current_token);
    }

    #[tokio::test(start_paused = true)]
    async fn overdue_sessions_are_auto_closed() {
        let config = RotationConfig {
            max_session_lifetime: Some(Duration::from_secs(60)),
            ..RotationConfig::default()
        };
        let m = SessionManager::new(timetable(), config);
        let snap = m
            .create_session(lecture(), "lect@uni.edu", Some(5))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(120)).await;

        let audit = m.get_session(&snap.id).await.unwrap();
        assert_eq!(audit.status, SessionStatus::Closed);
        assert!(audit.closed_at.is_some());

        // the lecture slot is free again
        let again = m.create_session(lecture(), "lect@uni.edu", None).await;
        assert!(again.is_ok());
    }
}
