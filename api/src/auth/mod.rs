pub mod claims;
pub mod extractors;

pub use claims::{AuthUser, Claims, Role};

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

/// Generates a JWT and its expiry timestamp for a verified identity. Login
/// itself is a collaborator concern; this helper backs the integration tests
/// and any upstream issuer sharing the secret.
pub fn generate_jwt(email: &str, name: &str, role: Role) -> (String, String) {
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let jwt_duration_minutes: i64 = env::var("JWT_DURATION_MINUTES")
        .ok()
        .and_then(|m| m.parse().ok())
        .unwrap_or(60);

    let expiry = Utc::now() + Duration::minutes(jwt_duration_minutes);
    let claims = Claims {
        sub: email.to_owned(),
        name: name.to_owned(),
        role,
        exp: expiry.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("Token encoding failed");

    (token, expiry.to_rfc3339())
}
