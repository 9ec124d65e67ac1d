//! Domain rules for player progression.

pub mod commands;
pub mod scoring;
pub mod titles;
