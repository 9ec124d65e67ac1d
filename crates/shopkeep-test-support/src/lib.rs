//! Shared test mocks and utilities for the Shopkeep counter kiosk.

mod clock;
mod generation;
mod notify;
mod repository;
mod rng;

pub use clock::FixedClock;
pub use generation::{FailingTextGenerator, ScriptedTextGenerator};
pub use notify::{FailingNotifier, RecordingNotifier};
pub use repository::{FailingProfileRepository, RecordingProfileRepository};
pub use rng::{MockRng, SeededRng, SequenceRng};
