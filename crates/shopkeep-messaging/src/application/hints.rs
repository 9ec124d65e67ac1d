//! Hint requests from the kiosk.

use shopkeep_core::clock::Clock;
use shopkeep_core::command::Command;
use shopkeep_core::notify::{Notifier, normalize_phone_number};
use shopkeep_core::profile::ProfileRepository;
use shopkeep_progression::application::profiles::handle_register_phone_number;
use shopkeep_progression::domain::commands::RegisterPhoneNumber;
use shopkeep_progression::domain::titles::TitleTable;
use tracing::{info, warn};

use crate::domain::commands::RequestHints;
use crate::domain::replies::{HINTS_MESSAGE, phone_fingerprint};

/// Handles `RequestHints`. Never fails: every problem is logged and reported
/// as `false`.
///
/// The number is registered on the visitor's profile before the text goes
/// out; if registration fails nothing is sent.
pub async fn handle_request_hints(
    command: &RequestHints,
    titles: &TitleTable,
    clock: &dyn Clock,
    profiles: &dyn ProfileRepository,
    notifier: &dyn Notifier,
) -> bool {
    let Some(phone_number) = normalize_phone_number(&command.phone_number) else {
        warn!(correlation_id = %command.correlation_id(), "hint request with implausible number");
        return false;
    };
    let fingerprint = phone_fingerprint(&phone_number);

    if let Some(visitor_id) = &command.visitor_id {
        let register = RegisterPhoneNumber {
            correlation_id: command.correlation_id(),
            visitor_id: visitor_id.clone(),
            phone_number: phone_number.clone(),
        };
        if let Err(e) = handle_register_phone_number(&register, titles, clock, profiles).await {
            warn!(%visitor_id, phone = %fingerprint, error = %e, "could not register phone number");
            return false;
        }
    }

    match notifier.send_sms(&phone_number, HINTS_MESSAGE).await {
        Ok(()) => {
            info!(correlation_id = %command.correlation_id(), phone = %fingerprint, "hints sent");
            true
        }
        Err(e) => {
            warn!(phone = %fingerprint, error = %e, "hints could not be sent");
            false
        }
    }
}
