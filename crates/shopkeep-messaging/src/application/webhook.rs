//! Inbound SMS webhook.

use shopkeep_core::command::Command;
use shopkeep_core::notify::normalize_phone_number;
use shopkeep_core::profile::ProfileRepository;
use tracing::{info, warn};

use crate::domain::commands::ReplyToInboundSms;
use crate::domain::inbound::InboundCommand;
use crate::domain::replies::{
    ARCHIVE_SEALED_MESSAGE, HELP_MESSAGE, NO_SCROLL_MESSAGE, phone_fingerprint, render_twiml,
    scroll_message, wisdom_message,
};

/// Handles `ReplyToInboundSms`, returning the TwiML document to send back.
///
/// Always produces a reply; store failures degrade to an apology.
pub async fn handle_inbound_sms(
    command: &ReplyToInboundSms,
    profiles: &dyn ProfileRepository,
) -> String {
    let inbound = InboundCommand::parse(&command.body);
    let sender = normalize_phone_number(&command.from).unwrap_or_else(|| command.from.trim().to_owned());
    let fingerprint = phone_fingerprint(&sender);
    info!(
        correlation_id = %command.correlation_id(),
        from = %fingerprint,
        command = ?inbound,
        "inbound sms"
    );

    let message = match inbound {
        InboundCommand::Wisdom => wisdom_message(),
        InboundCommand::Help => HELP_MESSAGE.to_owned(),
        InboundCommand::Scroll => match profiles.find_by_phone(&sender).await {
            Ok(Some(profile)) => scroll_message(&profile),
            Ok(None) => NO_SCROLL_MESSAGE.to_owned(),
            Err(e) => {
                warn!(from = %fingerprint, error = %e, "scroll lookup failed");
                ARCHIVE_SEALED_MESSAGE.to_owned()
            }
        },
    };

    render_twiml(&message)
}
