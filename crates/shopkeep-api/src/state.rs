//! Shared application state.

use std::sync::Arc;

use shopkeep_core::clock::Clock;
use shopkeep_core::generation::TextGenerator;
use shopkeep_core::notify::Notifier;
use shopkeep_core::profile::ProfileRepository;
use shopkeep_progression::domain::titles::TitleTable;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for timestamps.
    pub clock: Arc<dyn Clock>,
    /// Profile document store.
    pub profiles: Arc<dyn ProfileRepository>,
    /// Text-generation service.
    pub generator: Arc<dyn TextGenerator>,
    /// Outbound SMS.
    pub notifier: Arc<dyn Notifier>,
    /// Title ladder.
    pub titles: Arc<TitleTable>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("titles", &self.titles)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        profiles: Arc<dyn ProfileRepository>,
        generator: Arc<dyn TextGenerator>,
        notifier: Arc<dyn Notifier>,
        titles: TitleTable,
    ) -> Self {
        Self {
            clock,
            profiles,
            generator,
            notifier,
            titles: Arc::new(titles),
        }
    }
}
