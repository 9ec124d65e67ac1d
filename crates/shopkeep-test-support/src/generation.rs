//! Test text generators: scripted and failing `TextGenerator` doubles.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shopkeep_core::error::DomainError;
use shopkeep_core::generation::{GenerationRequest, TextGenerator};

/// A text generator that replays canned replies in order, repeating the last
/// one once the script runs out, and records every request.
#[derive(Debug)]
pub struct ScriptedTextGenerator {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedTextGenerator {
    /// Create a generator that answers with `replies` in order.
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            last: Mutex::new(String::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns every request received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedTextGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, DomainError> {
        self.requests.lock().unwrap().push(request);
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.replies.lock().unwrap().pop_front() {
            last.clone_from(&next);
        }
        Ok(last.clone())
    }
}

/// A text generator that always fails with `UpstreamUnavailable` and counts
/// how often it was called.
#[derive(Debug, Default)]
pub struct FailingTextGenerator {
    calls: AtomicUsize,
}

impl FailingTextGenerator {
    /// Create a new failing generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `generate` calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FailingTextGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::UpstreamUnavailable("request timed out".into()))
    }
}
