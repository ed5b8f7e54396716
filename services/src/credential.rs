//! Wire form of the scannable credential: `sessionId::token`.

pub const DELIMITER: &str = "::";

/// Builds the string rendered into the QR code.
pub fn encode(session_id: &str, token: &str) -> String {
    format!("{session_id}{DELIMITER}{token}")
}

/// Splits a scanned payload on the *first* delimiter only. Session ids and
/// tokens are hex, so neither component can contain `::` itself.
pub fn split(raw: &str) -> Option<(&str, &str)> {
    raw.split_once(DELIMITER)
        .filter(|(id, token)| !id.is_empty() && !token.is_empty())
}
