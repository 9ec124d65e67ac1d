//! Domain rules for messaging.

pub mod commands;
pub mod inbound;
pub mod replies;
