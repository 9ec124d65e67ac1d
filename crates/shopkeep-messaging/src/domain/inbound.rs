//! Inbound SMS command parsing.

/// What an inbound text asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundCommand {
    /// Counter tips.
    Wisdom,
    /// The sender's progression summary.
    Scroll,
    /// Anything unrecognised.
    Help,
}

impl InboundCommand {
    /// Parses the first word of `body`, ignoring case.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        match body.split_whitespace().next().map(str::to_ascii_uppercase).as_deref() {
            Some("WISDOM") => Self::Wisdom,
            Some("SCROLL") => Self::Scroll,
            _ => Self::Help,
        }
    }
}
