//! Application use cases for player progression.

pub mod evaluation;
pub mod profiles;
