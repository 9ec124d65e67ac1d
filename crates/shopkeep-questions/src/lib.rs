//! Shopkeep: question supply.
//!
//! Owns everything an NPC can ask: the static defaults keyed by actor kind,
//! conditional bonus content, parsing of generated prompts, the server-side
//! generation use case and the client-side question pool.

pub mod application;
pub mod domain;
pub mod pool;
