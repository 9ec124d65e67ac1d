//! Shopkeep: outbound gateways.
//!
//! `reqwest` adapters for the ports in `shopkeep-core`: an OpenAI-compatible
//! chat-completions client for text generation and a Twilio-style SMS sender.

pub mod llm;
pub mod sms;
