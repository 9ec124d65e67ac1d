//! Shopkeep: messaging.
//!
//! Outbound hint texts for visitors who leave a phone number, and the
//! inbound SMS webhook that answers `WISDOM`, `SCROLL` and help requests.

pub mod application;
pub mod domain;
