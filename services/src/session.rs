use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::task::JoinHandle;

use crate::recorder::AttendanceRecord;
use crate::timetable::LectureKey;
use crate::token::{self, TokenFreshness};

pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Closed,
}

/// One open attendance window for one lecture occurrence. Always lives behind
/// a `tokio::sync::Mutex`; rotation, scans, and closing all serialize on it,
/// so every reader sees the token pair either fully pre- or post-rotation.
pub struct Session {
    pub id: SessionId,
    pub lecture: LectureKey,
    pub owner_email: String,
    pub status: SessionStatus,
    pub current_token: String,
    pub current_token_issued_at: DateTime<Utc>,
    pub previous_token: Option<String>,
    pub previous_token_expires_at: Option<DateTime<Utc>>,
    pub rotation_seconds: u64,
    pub grace_seconds: u64,
    /// Students already credited, keyed by email. The map doubles as the
    /// audit trail; a student can never appear twice.
    pub attendees: HashMap<String, AttendanceRecord>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub(crate) rotation_task: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        lecture: LectureKey,
        owner_email: &str,
        rotation_seconds: u64,
        grace_seconds: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: token::issue_session_id(),
            lecture,
            owner_email: owner_email.to_owned(),
            status: SessionStatus::Active,
            current_token: token::issue_token(),
            current_token_issued_at: now,
            previous_token: None,
            previous_token_expires_at: None,
            rotation_seconds,
            grace_seconds,
            attendees: HashMap::new(),
            created_at: now,
            closed_at: None,
            rotation_task: None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Swaps in a fresh token. The outgoing token stays valid for the grace
    /// window so a scan of the previous QR frame still lands.
    pub fn rotate(&mut self, now: DateTime<Utc>) {
        let fresh = token::issue_token();
        let outgoing = std::mem::replace(&mut self.current_token, fresh);
        self.previous_token = Some(outgoing);
        self.previous_token_expires_at = Some(now + Duration::seconds(self.grace_seconds as i64));
        self.current_token_issued_at = now;
    }

    pub fn classify_token(&self, presented: &str, now: DateTime<Utc>) -> TokenFreshness {
        if presented == self.current_token {
            return TokenFreshness::Current;
        }
        match (&self.previous_token, self.previous_token_expires_at) {
            (Some(prev), Some(expires)) if presented == prev => {
                if now <= expires {
                    TokenFreshness::Grace
                } else {
                    TokenFreshness::Expired
                }
            }
            _ => TokenFreshness::Unknown,
        }
    }

    /// Flips the session to `Closed`, drops both tokens, and aborts the
    /// rotation task. Must be called with the session lock held so no scan or
    /// rotation can observe a half-closed state.
    pub fn close(&mut self, now: DateTime<Utc>) {
        self.status = SessionStatus::Closed;
        self.closed_at = Some(now);
        self.previous_token = None;
        self.previous_token_expires_at = None;
        if let Some(task) = self.rotation_task.take() {
            task.abort();
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            lecture: self.lecture.clone(),
            owner_email: self.owner_email.clone(),
            status: self.status,
            current_token: self.current_token.clone(),
            current_token_issued_at: self.current_token_issued_at,
            rotation_seconds: self.rotation_seconds,
            grace_seconds: self.grace_seconds,
            attendee_count: self.attendees.len(),
            created_at: self.created_at,
            closed_at: self.closed_at,
        }
    }
}

/// Owned copy of a session's externally visible state, safe to hand out after
/// the lock is released.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub lecture: LectureKey,
    pub owner_email: String,
    pub status: SessionStatus,
    pub current_token: String,
    pub current_token_issued_at: DateTime<Utc>,
    pub rotation_seconds: u64,
    pub grace_seconds: u64,
    pub attendee_count: usize,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lecture() -> LectureKey {
        LectureKey {
            branch: "CE".into(),
            semester: 3,
            day: "Monday".into(),
            slot: 1,
            subject: "Algorithms".into(),
        }
    }

    fn t(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap() + Duration::seconds(secs as i64)
    }

    #[test]
    fn rotation_moves_current_into_grace() {
        let mut s = Session::new(lecture(), "lect@uni.edu", 7, 3, t(0));
        let t0 = s.current_token.clone();

        s.rotate(t(7));

        assert_ne!(s.current_token, t0);
        assert_eq!(s.previous_token.as_deref(), Some(t0.as_str()));
        assert_eq!(s.previous_token_expires_at, Some(t(10)));
        assert_eq!(s.current_token_issued_at, t(7));
    }

    #[test]
    fn classification_matches_spec_windows() {
        let mut s = Session::new(lecture(), "lect@uni.edu", 7, 3, t(0));
        let t0 = s.current_token.clone();
        s.rotate(t(7));
        let t1 = s.current_token.clone();

        // current is always acceptable, even right after issue
        assert_eq!(s.classify_token(&t1, t(7)), TokenFreshness::Current);
        // previous token only inside the grace window
        assert_eq!(s.classify_token(&t0, t(9)), TokenFreshness::Grace);
        assert_eq!(s.classify_token(&t0, t(10)), TokenFreshness::Grace);
        assert_eq!(s.classify_token(&t0, t(11)), TokenFreshness::Expired);
        // anything else is forged
        assert_eq!(
            s.classify_token("ffffffffffffffffffffffffffffffff", t(8)),
            TokenFreshness::Unknown
        );
    }

    #[test]
    fn grace_boundary_follows_the_configured_length() {
        // a longer grace extends the window for the previous token
        let mut s = Session::new(lecture(), "lect@uni.edu", 10, 5, t(0));
        let t0 = s.current_token.clone();
        s.rotate(t(10));

        assert_eq!(s.previous_token_expires_at, Some(t(15)));
        assert_eq!(s.classify_token(&t0, t(15)), TokenFreshness::Grace);
        assert_eq!(s.classify_token(&t0, t(16)), TokenFreshness::Expired);

        // a zero grace makes the previous token expire at the rotation itself
        let mut s = Session::new(lecture(), "lect@uni.edu", 10, 0, t(0));
        let t0 = s.current_token.clone();
        s.rotate(t(10));

        assert_eq!(s.classify_token(&t0, t(10)), TokenFreshness::Grace);
        assert_eq!(s.classify_token(&t0, t(11)), TokenFreshness::Expired);
    }

    #[test]
    fn token_from_two_rotations_ago_is_unknown() {
        let mut s = Session::new(lecture(), "lect@uni.edu", 7, 3, t(0));
        let t0 = s.current_token.clone();
        s.rotate(t(7));
        s.rotate(t(14));
        assert_eq!(s.classify_token(&t0, t(14)), TokenFreshness::Unknown);
    }

    #[test]
    fn close_invalidates_all_tokens() {
        let mut s = Session::new(lecture(), "lect@uni.edu", 7, 3, t(0));
        s.rotate(t(7));
        let current = s.current_token.clone();

        s.close(t(8));

        assert_eq!(s.status, SessionStatus::Closed);
        assert_eq!(s.closed_at, Some(t(8)));
        assert!(s.previous_token.is_none());
        // the stale current token still matches string-wise; callers must gate
        // on status first, which is what the recorder does
        assert!(!s.is_active());
        assert_eq!(s.classify_token(&current, t(8)), TokenFreshness::Current);
    }
}
