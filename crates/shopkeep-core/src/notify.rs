//! Outbound notification port (SMS).

use async_trait::async_trait;

use crate::error::DomainError;

/// Port to the outbound SMS provider.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `body` to `to`.
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), DomainError>;
}

/// Returns `true` if `raw` looks like a dialable number: an optional leading
/// `+` followed by 7 to 15 digits. Spaces, dashes and parentheses are
/// ignored.
#[must_use]
pub fn is_plausible_phone_number(raw: &str) -> bool {
    normalize_phone_number(raw).is_some()
}

/// Strips separators from a phone number, keeping a leading `+`.
#[must_use]
pub fn normalize_phone_number(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };
    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return None,
        }
    }
    if (7..=15).contains(&digits.len()) {
        Some(format!("{plus}{digits}"))
    } else {
        None
    }
}
