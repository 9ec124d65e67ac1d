//! Application services for the question supply.

pub mod generation;
