//! Commands for the messaging context.

use shopkeep_core::command::Command;
use shopkeep_core::profile::VisitorId;
use uuid::Uuid;

/// Command to text hints to a visitor.
#[derive(Debug, Clone)]
pub struct RequestHints {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The visitor to register the number on, if known.
    pub visitor_id: Option<VisitorId>,
    /// Phone number as typed by the visitor.
    pub phone_number: String,
}

impl Command for RequestHints {
    fn command_type(&self) -> &'static str {
        "messaging.request_hints"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to answer an inbound SMS.
#[derive(Debug, Clone)]
pub struct ReplyToInboundSms {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Sender number from the provider's `From` field.
    pub from: String,
    /// Message text from the provider's `Body` field.
    pub body: String,
}

impl Command for ReplyToInboundSms {
    fn command_type(&self) -> &'static str {
        "messaging.reply_to_inbound_sms"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
