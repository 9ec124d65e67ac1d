//! Shopkeep: progression.
//!
//! Turns scored feedback into player progress: extracts the numeric score
//! from the generator's reply, updates cumulative counters, promotes the
//! player through the title table and keeps visit accounting.

pub mod application;
pub mod domain;
