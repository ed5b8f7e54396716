use rand::RngCore;

/// 128 bits of entropy per credential; guessing a token inside a 5-10 second
/// rotation window is not feasible.
pub const TOKEN_BYTES: usize = 16;

/// Issues a fresh rotating token: random bytes from the OS RNG, hex-encoded
/// for transport inside a QR payload.
pub fn issue_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Session ids come from the same generator. They are opaque handles, not
/// sequence numbers.
pub fn issue_session_id() -> String {
    issue_token()
}

/// Freshness of a presented token relative to a session's token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFreshness {
    /// Matches the live token.
    Current,
    /// Matches the previous token and its grace window has not elapsed.
    Grace,
    /// Matches the previous token but the grace window has elapsed.
    Expired,
    /// Matches neither token; treated as forged.
    Unknown,
}

impl TokenFreshness {
    pub fn is_acceptable(self) -> bool {
        matches!(self, TokenFreshness::Current | TokenFreshness::Grace)
    }
}
