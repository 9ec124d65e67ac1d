//! Shopkeep: counter kiosk.
//!
//! Drives one NPC at a time up to the counter, hands its question to the
//! dialogue panel through the session bridge and waits for the player's
//! answer. Rendering is left to whoever subscribes to lifecycle events.

pub mod actor;
pub mod api_client;
pub mod bridge;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod lifecycle;
