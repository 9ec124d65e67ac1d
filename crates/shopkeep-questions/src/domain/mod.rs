//! Domain types for the question supply.

pub mod bonus;
pub mod defaults;
pub mod parsing;
