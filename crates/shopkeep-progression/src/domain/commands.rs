//! Commands for the progression context.

use shopkeep_core::command::Command;
use shopkeep_core::profile::VisitorId;
use uuid::Uuid;

/// Command to score an answer and credit it to a visitor.
#[derive(Debug, Clone)]
pub struct EvaluateAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The question the NPC asked.
    pub question: String,
    /// The player's answer.
    pub answer: String,
    /// The visitor to credit; anonymous answers are scored but not counted.
    pub visitor_id: Option<VisitorId>,
}

impl Command for EvaluateAnswer {
    fn command_type(&self) -> &'static str {
        "progression.evaluate_answer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to fetch a profile, creating it on first sight and counting the
/// visit otherwise.
#[derive(Debug, Clone)]
pub struct LookUpProfile {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The visitor to look up.
    pub visitor_id: VisitorId,
    /// Raw User-Agent of the kiosk client, if sent.
    pub client_signature: Option<String>,
}

impl Command for LookUpProfile {
    fn command_type(&self) -> &'static str {
        "progression.look_up_profile"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to attach a phone number to a visitor's profile.
#[derive(Debug, Clone)]
pub struct RegisterPhoneNumber {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The visitor to update.
    pub visitor_id: VisitorId,
    /// Normalized phone number.
    pub phone_number: String,
}

impl Command for RegisterPhoneNumber {
    fn command_type(&self) -> &'static str {
        "progression.register_phone_number"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
