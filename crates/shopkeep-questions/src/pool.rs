//! The question pool: a depleting, asynchronously replenished supply of
//! prompts for the NPC lifecycle.
//!
//! `draw` never blocks and never fails. When the pool runs dry it answers
//! with the actor's default question and starts one background refill.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use shopkeep_core::actor::ActorType;
use shopkeep_core::client::ClientClass;
use shopkeep_core::error::DomainError;
use shopkeep_core::rng::DeterministicRng;
use tracing::{debug, info, warn};

use crate::domain::bonus::BonusContent;
use crate::domain::defaults::{default_pool, default_question};
use crate::domain::parsing::dedupe;

/// Where fresh prompts come from (the generation endpoint, in practice).
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetches up to `count` prompts.
    async fn fetch_questions(&self, count: usize) -> Result<Vec<String>, DomainError>;
}

/// What a refill put into the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillOutcome {
    /// The pool now holds this many generated prompts.
    Generated(usize),
    /// The source failed; the pool now holds this many default prompts.
    Fallback(usize),
}

#[derive(Debug)]
struct PoolState {
    questions: Vec<String>,
    actor_types: Vec<ActorType>,
    bonus_merged: bool,
    // Merged bonus prompts not drawn yet. They survive every refill.
    bonus_front: Vec<String>,
    bonus_back: Vec<String>,
}

impl PoolState {
    fn replace_questions(&mut self, questions: Vec<String>) {
        self.questions = questions;
        self.apply_bonus();
    }

    fn apply_bonus(&mut self) {
        for question in self.bonus_front.iter().rev() {
            if !self.questions.contains(question) {
                self.questions.insert(0, question.clone());
            }
        }
        for question in &self.bonus_back {
            if !self.questions.contains(question) {
                self.questions.push(question.clone());
            }
        }
    }

    fn forget_bonus(&mut self, question: &str) {
        self.bonus_front.retain(|q| q != question);
        self.bonus_back.retain(|q| q != question);
    }
}

struct PoolInner {
    state: Mutex<PoolState>,
    source: Arc<dyn QuestionSource>,
    rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    refill_in_flight: AtomicBool,
}

/// Shared handle to the question pool. Cloning is cheap.
#[derive(Clone)]
pub struct QuestionPoolManager {
    inner: Arc<PoolInner>,
}

impl std::fmt::Debug for QuestionPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionPoolManager")
            .field("state", &*self.state())
            .field(
                "refill_in_flight",
                &self.inner.refill_in_flight.load(Ordering::SeqCst),
            )
            .finish_non_exhaustive()
    }
}

impl QuestionPoolManager {
    /// Creates an empty pool serving the base actor kinds.
    #[must_use]
    pub fn new(
        source: Arc<dyn QuestionSource>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState {
                    questions: Vec::new(),
                    actor_types: ActorType::BASE.to_vec(),
                    bonus_merged: false,
                    bonus_front: Vec::new(),
                    bonus_back: Vec::new(),
                }),
                source,
                rng,
                refill_in_flight: AtomicBool::new(false),
            }),
        }
    }

    // A panic while holding the lock cannot leave the vectors half-updated,
    // so a poisoned guard is still usable.
    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Actor kinds currently available for spawning.
    #[must_use]
    pub fn actor_types(&self) -> Vec<ActorType> {
        self.state().actor_types.clone()
    }

    /// Prompts left before the next refill.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().questions.len()
    }

    /// Whether the pool is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().questions.is_empty()
    }

    /// Copy of the remaining prompts, in pool order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.state().questions.clone()
    }

    /// Whether a background refill is running.
    #[must_use]
    pub fn refill_in_flight(&self) -> bool {
        self.inner.refill_in_flight.load(Ordering::SeqCst)
    }

    /// Removes and returns a uniformly random prompt.
    ///
    /// An empty pool yields the default question for `actor_type` and
    /// triggers a background refill. Must be called inside a tokio runtime.
    pub fn draw(&self, actor_type: &ActorType) -> String {
        {
            let mut state = self.state();
            if !state.questions.is_empty() {
                let index = {
                    let mut rng = self
                        .inner
                        .rng
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    rng.next_index(state.questions.len())
                };
                let question = state.questions.remove(index);
                state.forget_bonus(&question);
                debug!(%actor_type, remaining = state.questions.len(), "drew pooled question");
                return question;
            }
        }

        info!(%actor_type, "question pool empty, serving default and refilling");
        self.trigger_refill();
        default_question(actor_type).to_owned()
    }

    /// Starts a background refill unless one is already running. Returns
    /// whether a new refill was started.
    pub fn trigger_refill(&self) -> bool {
        if self
            .inner
            .refill_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("refill already in flight");
            return false;
        }

        let pool = self.clone();
        tokio::spawn(async move {
            pool.refill().await;
            pool.inner.refill_in_flight.store(false, Ordering::SeqCst);
        });
        true
    }

    /// Replaces the pool with `2 × |actor types|` fresh prompts, or with
    /// the static defaults if the source fails. Merged bonus prompts that
    /// have not been drawn are kept. Never returns an error.
    pub async fn refill(&self) -> RefillOutcome {
        let requested = 2 * self.state().actor_types.len();

        let fetched = match self.inner.source.fetch_questions(requested).await {
            Ok(questions) => dedupe(questions),
            Err(e) => {
                warn!(error = %e, "question source failed, pool falls back to defaults");
                Vec::new()
            }
        };

        let mut state = self.state();
        if fetched.is_empty() {
            let count = default_pool().len();
            state.replace_questions(default_pool());
            info!(count, pooled = state.questions.len(), "question pool filled with defaults");
            RefillOutcome::Fallback(count)
        } else {
            let count = fetched.len();
            state.replace_questions(fetched);
            info!(requested, count, pooled = state.questions.len(), "question pool replenished");
            RefillOutcome::Generated(count)
        }
    }

    /// Merges the bonus content a visitor qualifies for. Runs once per
    /// pool; later calls return `false` and change nothing.
    pub fn merge_bonus(&self, content: &BonusContent, client: ClientClass, visit_count: u32) -> bool {
        let selection = content.select(client, visit_count);

        let mut state = self.state();
        if state.bonus_merged {
            return false;
        }
        state.bonus_merged = true;
        state.bonus_front = selection.front;
        state.bonus_back = selection.back;
        state.apply_bonus();
        for actor_type in selection.actor_types {
            if !state.actor_types.contains(&actor_type) {
                info!(%actor_type, %client, visit_count, "bonus actor unlocked");
                state.actor_types.push(actor_type);
            }
        }
        true
    }
}
