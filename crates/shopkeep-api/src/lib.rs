//! Shopkeep: HTTP API.
//!
//! Serves profile lookup, answer evaluation, question generation and the
//! SMS endpoints to the counter kiosk.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
