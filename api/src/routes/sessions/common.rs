use serde::{Deserialize, Serialize};
use services::{LectureKey, SessionSnapshot, credential};

#[derive(Debug, Deserialize)]
pub struct CreateSessionReq {
    pub branch: String,
    pub semester: u8,
    pub day: String,
    pub slot: u8,
    pub subject: String,
    /// Optional cadence override; clamped server-side to the product range.
    pub rotation_seconds: Option<u64>,
}

impl CreateSessionReq {
    pub fn lecture_key(&self) -> LectureKey {
        LectureKey {
            branch: self.branch.clone(),
            semester: self.semester,
            day: self.day.clone(),
            slot: self.slot,
            subject: self.subject.clone(),
        }
    }
}

/// Returned on creation: everything the presenting client needs to render
/// the first QR frame and start polling.
#[derive(Debug, Default, Serialize)]
pub struct SessionCreatedResponse {
    pub id: String,
    pub subject: String,
    pub qr_value: String,
    pub token: String,
    pub token_issued_at: String,
    pub rotation_seconds: u64,
    pub created_at: String,
}

impl From<SessionSnapshot> for SessionCreatedResponse {
    fn from(s: SessionSnapshot) -> Self {
        Self {
            id: s.id.clone(),
            subject: s.lecture.subject.clone(),
            qr_value: credential::encode(&s.id, &s.current_token),
            token: s.current_token,
            token_issued_at: s.current_token_issued_at.to_rfc3339(),
            rotation_seconds: s.rotation_seconds,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

/// Returned by the credential poll: the fresh QR payload.
#[derive(Debug, Default, Serialize)]
pub struct CredentialResponse {
    pub qr_value: String,
    pub token: String,
    pub token_issued_at: String,
}

/// Audit view of a session; never exposes token material.
#[derive(Debug, Default, Serialize)]
pub struct SessionDetailResponse {
    pub id: String,
    pub branch: String,
    pub semester: u8,
    pub day: String,
    pub slot: u8,
    pub subject: String,
    pub owner_email: String,
    pub status: String,
    pub rotation_seconds: u64,
    pub attendee_count: usize,
    pub created_at: String,
    pub closed_at: Option<String>,
}

impl From<SessionSnapshot> for SessionDetailResponse {
    fn from(s: SessionSnapshot) -> Self {
        Self {
            id: s.id,
            branch: s.lecture.branch,
            semester: s.lecture.semester,
            day: s.lecture.day,
            slot: s.lecture.slot,
            subject: s.lecture.subject,
            owner_email: s.owner_email,
            status: match s.status {
                services::SessionStatus::Active => "active".into(),
                services::SessionStatus::Closed => "closed".into(),
            },
            rotation_seconds: s.rotation_seconds,
            attendee_count: s.attendee_count,
            created_at: s.created_at.to_rfc3339(),
            closed_at: s.closed_at.map(|t| t.to_rfc3339()),
        }
    }
}
