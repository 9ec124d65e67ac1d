//! Test notifiers: recording and failing `Notifier` doubles.

use std::sync::Mutex;

use async_trait::async_trait;
use shopkeep_core::error::DomainError;
use shopkeep_core::notify::Notifier;

/// A notifier that records every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    /// Create a new recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all `(to, body)` pairs sent.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), DomainError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_owned(), body.to_owned()));
        Ok(())
    }
}

/// A notifier whose provider is always down.
#[derive(Debug)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_sms(&self, _to: &str, _body: &str) -> Result<(), DomainError> {
        Err(DomainError::UpstreamUnavailable("sms provider rejected request".into()))
    }
}
