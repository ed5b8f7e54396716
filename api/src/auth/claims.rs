use serde::{Deserialize, Serialize};

/// Coarse role carried in the JWT. Faculty open and close sessions; students
/// scan; admin exists for operational tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Faculty,
    Student,
    Admin,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Verified email address of the caller.
    pub sub: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);
