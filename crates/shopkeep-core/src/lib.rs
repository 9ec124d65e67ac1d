//! Shopkeep Core: shared domain abstractions.
//!
//! This crate defines the types and ports that every other crate in the
//! kiosk depends on: actor kinds, client classification, the player profile
//! record and its repository, and the outbound text-generation and
//! notification ports. It contains no infrastructure code.

pub mod actor;
pub mod client;
pub mod clock;
pub mod command;
pub mod error;
pub mod generation;
pub mod notify;
pub mod profile;
pub mod rng;
