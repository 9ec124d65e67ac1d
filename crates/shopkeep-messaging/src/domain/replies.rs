//! Reply texts, TwiML rendering and log-safe phone fingerprints.

use sha2::{Digest, Sha256};
use shopkeep_core::profile::PlayerProfile;

/// Sent after a successful hint request.
pub const HINTS_MESSAGE: &str = "Greetings from the counter! Wise shopkeepers first ask \
what changed, then try the simplest remedy: restart, reconnect, update. \
Text WISDOM for more counsel or SCROLL to read thy record.";

/// Tips returned for `WISDOM`.
pub const WISDOM_TIPS: [&str; 3] = [
    "A device that will not wake often needs but a full restart.",
    "When the wireless signal falters, move closer to its source or reseat the router.",
    "Before blaming sorcery, check that every cable is firmly seated.",
];

/// Returned for `SCROLL` when the sender has no profile.
pub const NO_SCROLL_MESSAGE: &str =
    "No scroll bears thy number. Visit the counter and request hints to begin thy record.";

/// Returned for `SCROLL` when the archive cannot be read.
pub const ARCHIVE_SEALED_MESSAGE: &str =
    "The archives are sealed for the moment. Try again anon.";

/// Returned for anything unrecognised.
pub const HELP_MESSAGE: &str = "Text WISDOM for counter tips or SCROLL to read thy record.";

/// Body of the `WISDOM` reply.
#[must_use]
pub fn wisdom_message() -> String {
    let mut message = String::from("Counsel of the counter:");
    for tip in WISDOM_TIPS {
        message.push('\n');
        message.push_str("- ");
        message.push_str(tip);
    }
    message
}

/// Body of the `SCROLL` reply for `profile`.
#[must_use]
pub fn scroll_message(profile: &PlayerProfile) -> String {
    format!(
        "Thy scroll: {}/{} answers judged wise. Title: {}.",
        profile.good_answer_count, profile.answer_count, profile.current_title
    )
}

/// Wraps `message` in a TwiML `<Response>`.
#[must_use]
pub fn render_twiml(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Response><Message>{}</Message></Response>",
        escape_xml(message)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Short, stable digest of a phone number for log fields.
#[must_use]
pub fn phone_fingerprint(phone_number: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(phone_number.as_bytes()));
    digest[..12].to_owned()
}
