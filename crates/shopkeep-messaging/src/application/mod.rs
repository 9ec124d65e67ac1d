//! Application use cases for messaging.

pub mod hints;
pub mod webhook;
