//! Text-generation port.
//!
//! The language model is an external collaborator. Callers hand it a fixed
//! instruction contract and receive the raw reply text; parsing the reply is
//! the caller's job.

use async_trait::async_trait;

use crate::error::DomainError;

/// A single prompt for the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Instruction contract describing the expected output format.
    pub system_prompt: String,
    /// The concrete request.
    pub user_prompt: String,
    /// Sampling temperature, if the caller wants to override the default.
    pub temperature: Option<f32>,
    /// Output token cap.
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Creates a request with default sampling parameters.
    #[must_use]
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the output token cap.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Port to the text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a reply for `request`.
    ///
    /// Transport failures, non-2xx responses and timeouts are reported as
    /// `DomainError::UpstreamUnavailable`.
    async fn generate(&self, request: GenerationRequest) -> Result<String, DomainError>;
}
