//! The NPC lifecycle: one actor at a time walks up, asks, waits, leaves.
//!
//! Runs as a single tokio task. Every timer and the answer wait race the
//! shutdown signal, so `LifecycleHandle::shutdown` never waits on a
//! sleeping actor.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use shopkeep_core::actor::ActorType;
use shopkeep_core::error::DomainError;
use shopkeep_core::rng::DeterministicRng;
use shopkeep_questions::pool::QuestionPoolManager;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::actor::{Actor, ActorPhase};
use crate::bridge::SessionBridge;

const EVENT_CAPACITY: usize = 64;

/// Fixed durations of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimings {
    /// Wait before reselecting when sprites are missing.
    pub missing_sprite_backoff: Duration,
    /// Fade-in before the walk starts.
    pub fade_in: Duration,
    /// Walk to the counter.
    pub approach: Duration,
    /// Walk away from the counter.
    pub depart: Duration,
    /// Pause between despawn and the next spawn.
    pub respawn_delay: Duration,
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            missing_sprite_backoff: Duration::from_millis(1000),
            fade_in: Duration::from_millis(500),
            approach: Duration::from_millis(4000),
            depart: Duration::from_millis(4000),
            respawn_delay: Duration::from_millis(1000),
        }
    }
}

impl LifecycleTimings {
    /// All durations zero.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            missing_sprite_backoff: Duration::ZERO,
            fade_in: Duration::ZERO,
            approach: Duration::ZERO,
            depart: Duration::ZERO,
            respawn_delay: Duration::ZERO,
        }
    }
}

/// Tells the lifecycle whether an actor kind can be drawn.
pub trait SpriteCatalog: Send + Sync {
    fn has_sprites(&self, actor_type: &ActorType) -> bool;
}

/// Catalog that assumes every kind is drawable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllSprites;

impl SpriteCatalog for AllowAllSprites {
    fn has_sprites(&self, _actor_type: &ActorType) -> bool {
        true
    }
}

/// Catalog backed by an asset directory with one folder per actor key.
#[derive(Debug, Clone)]
pub struct AssetDirectory {
    root: PathBuf,
}

impl AssetDirectory {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SpriteCatalog for AssetDirectory {
    fn has_sprites(&self, actor_type: &ActorType) -> bool {
        self.root.join(actor_type.key()).is_dir()
    }
}

/// Published on every lifecycle step for renderers and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// An actor entered `phase`.
    Phase {
        actor_id: Uuid,
        actor_type: ActorType,
        phase: ActorPhase,
    },
    /// The chosen kind had no sprites; another will be chosen.
    ResourceMissing { actor_type: ActorType },
    /// The actor's question went to the dialogue panel.
    QuestionShown { actor_id: Uuid, question: String },
    /// The player's answer came back.
    AnswerReceived { actor_id: Uuid, answer: String },
}

/// Picks the next actor kind uniformly at random, never repeating
/// `previous` when another kind is available.
pub fn choose_actor_type(
    available: &[ActorType],
    previous: Option<&ActorType>,
    rng: &mut dyn DeterministicRng,
) -> Option<ActorType> {
    let candidates: Vec<&ActorType> = if available.len() > 1 {
        available.iter().filter(|t| Some(*t) != previous).collect()
    } else {
        available.iter().collect()
    };
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.next_index(candidates.len())].clone())
}

/// The lifecycle before it is started.
pub struct NpcLifecycle {
    pool: QuestionPoolManager,
    bridge: SessionBridge,
    sprites: Arc<dyn SpriteCatalog>,
    rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    timings: LifecycleTimings,
    events: broadcast::Sender<LifecycleEvent>,
}

impl std::fmt::Debug for NpcLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NpcLifecycle")
            .field("pool", &self.pool)
            .field("bridge", &self.bridge)
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

/// The lifecycle stopped early.
struct Stopped;

impl NpcLifecycle {
    #[must_use]
    pub fn new(
        pool: QuestionPoolManager,
        bridge: SessionBridge,
        sprites: Arc<dyn SpriteCatalog>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        timings: LifecycleTimings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            pool,
            bridge,
            sprites,
            rng,
            timings,
            events,
        }
    }

    /// Subscribes to lifecycle events. Subscribe before `start` to see the
    /// first spawn.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Starts the lifecycle task.
    #[must_use]
    pub fn start(self) -> LifecycleHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let events = self.events.clone();
        let task = tokio::spawn(self.run(shutdown_rx));
        LifecycleHandle {
            shutdown: shutdown_tx,
            events,
            task,
        }
    }

    fn emit(&self, event: LifecycleEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn emit_phase(&self, actor: &Actor) {
        debug!(actor_id = %actor.id, actor_type = %actor.actor_type, phase = %actor.phase(), "actor phase");
        self.emit(LifecycleEvent::Phase {
            actor_id: actor.id,
            actor_type: actor.actor_type.clone(),
            phase: actor.phase(),
        });
    }

    fn advance(&self, actor: &mut Actor) {
        match actor.advance() {
            Ok(_) => self.emit_phase(actor),
            Err(e) => warn!(actor_id = %actor.id, error = %e, "actor could not advance"),
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("npc lifecycle started");
        let mut previous: Option<ActorType> = None;
        loop {
            let Ok(actor_type) = self.visit(previous.as_ref(), &mut shutdown).await else {
                break;
            };
            previous = Some(actor_type);
            if pause(self.timings.respawn_delay, &mut shutdown).await.is_err() {
                break;
            }
        }
        self.bridge.hide();
        info!("npc lifecycle stopped");
    }

    // Kinds found without sprites during this visit are skipped while any
    // other kind remains.
    fn pick(&self, previous: Option<&ActorType>, missing: &[ActorType]) -> Option<ActorType> {
        let mut available = self.pool.actor_types();
        if available.iter().any(|t| !missing.contains(t)) {
            available.retain(|t| !missing.contains(t));
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        choose_actor_type(&available, previous, &mut *rng)
    }

    // One actor from spawn to despawn. Returns the actor's kind.
    async fn visit(
        &self,
        previous: Option<&ActorType>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<ActorType, Stopped> {
        let mut missing: Vec<ActorType> = Vec::new();
        let actor_type = loop {
            let Some(chosen) = self.pick(previous, &missing) else {
                warn!("no actor kinds available");
                pause(self.timings.missing_sprite_backoff, shutdown).await?;
                continue;
            };
            if self.sprites.has_sprites(&chosen) {
                break chosen;
            }
            let error = DomainError::ResourceMissing(chosen.key().to_owned());
            warn!(actor_type = %chosen, %error, "cannot spawn actor, reselecting after backoff");
            self.emit(LifecycleEvent::ResourceMissing {
                actor_type: chosen.clone(),
            });
            if !missing.contains(&chosen) {
                missing.push(chosen);
            }
            pause(self.timings.missing_sprite_backoff, shutdown).await?;
        };

        let mut actor = Actor::new(actor_type.clone());
        info!(actor_id = %actor.id, %actor_type, "actor spawned");
        self.emit_phase(&actor);

        self.advance(&mut actor);
        pause(self.timings.fade_in + self.timings.approach, shutdown).await?;

        let question = self.pool.draw(&actor_type);
        actor.assign_question(question.clone());
        let answer_slot = self.bridge.install_answer_slot();
        if !self.bridge.show(actor.id, question.clone(), actor_type.clone()) {
            warn!(actor_id = %actor.id, "no dialogue panel attached, waiting anyway");
        }
        self.emit(LifecycleEvent::QuestionShown {
            actor_id: actor.id,
            question,
        });
        self.advance(&mut actor);

        let answer = tokio::select! {
            answer = answer_slot => answer.ok(),
            _ = shutdown.changed() => return Err(Stopped),
        };
        match answer {
            Some(answer) => {
                info!(actor_id = %actor.id, "answer received");
                self.emit(LifecycleEvent::AnswerReceived {
                    actor_id: actor.id,
                    answer: answer.clone(),
                });
                actor.receive_answer(answer);
            }
            None => warn!(actor_id = %actor.id, "answer slot abandoned, departing"),
        }

        self.advance(&mut actor);
        self.bridge.hide();
        pause(self.timings.depart, shutdown).await?;

        self.advance(&mut actor);
        info!(actor_id = %actor.id, %actor_type, "actor despawned");
        Ok(actor_type)
    }
}

// Sleeps for `duration` unless shutdown is signalled first.
async fn pause(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> Result<(), Stopped> {
    if *shutdown.borrow() {
        return Err(Stopped);
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => Ok(()),
        _ = shutdown.changed() => Err(Stopped),
    }
}

/// Owns the running lifecycle task.
#[derive(Debug)]
pub struct LifecycleHandle {
    shutdown: watch::Sender<bool>,
    events: broadcast::Sender<LifecycleEvent>,
    task: JoinHandle<()>,
}

impl LifecycleHandle {
    /// Subscribes to lifecycle events from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// Cancels the pending timer or wait and joins the task.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "npc lifecycle task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use shopkeep_questions::pool::QuestionSource;
    use shopkeep_test_support::{MockRng, SeededRng, SequenceRng};
    use tokio::time::timeout;

    use super::*;
    use crate::bridge::DialogueMessage;

    const WAIT: Duration = Duration::from_secs(5);

    struct StaticSource;

    #[async_trait]
    impl QuestionSource for StaticSource {
        async fn fetch_questions(&self, count: usize) -> Result<Vec<String>, DomainError> {
            Ok((0..count).map(|i| format!("Generated question {i}?")).collect())
        }
    }

    struct MissingSprites(Vec<ActorType>);

    impl SpriteCatalog for MissingSprites {
        fn has_sprites(&self, actor_type: &ActorType) -> bool {
            !self.0.contains(actor_type)
        }
    }

    fn lifecycle(
        bridge: &SessionBridge,
        sprites: Arc<dyn SpriteCatalog>,
        rng: impl DeterministicRng + Send + 'static,
    ) -> NpcLifecycle {
        let pool = QuestionPoolManager::new(Arc::new(StaticSource), Arc::new(Mutex::new(MockRng)));
        NpcLifecycle::new(
            pool,
            bridge.clone(),
            sprites,
            Arc::new(Mutex::new(rng)),
            LifecycleTimings::immediate(),
        )
    }

    async fn next_show(rx: &mut crate::bridge::DialogueReceiver) -> (Uuid, ActorType) {
        loop {
            match timeout(WAIT, rx.recv()).await.unwrap().unwrap() {
                DialogueMessage::Show {
                    actor_id,
                    actor_type,
                    ..
                } => return (actor_id, actor_type),
                DialogueMessage::Hide => {}
            }
        }
    }

    #[test]
    fn test_choose_never_repeats_over_100_spawns() {
        let mut rng = SeededRng::new(7);
        let available = ActorType::BASE.to_vec();
        let mut previous: Option<ActorType> = None;

        for _ in 0..100 {
            let chosen = choose_actor_type(&available, previous.as_ref(), &mut rng).unwrap();
            assert_ne!(Some(&chosen), previous.as_ref());
            previous = Some(chosen);
        }
    }

    #[test]
    fn test_choose_with_two_kinds_alternates() {
        let mut rng = SeededRng::new(1);
        let available = vec![ActorType::King, ActorType::Nun];

        let first = choose_actor_type(&available, None, &mut rng).unwrap();
        let second = choose_actor_type(&available, Some(&first), &mut rng).unwrap();
        let third = choose_actor_type(&available, Some(&second), &mut rng).unwrap();

        assert_ne!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_choose_single_kind_may_repeat() {
        let available = vec![ActorType::Miner];

        let chosen = choose_actor_type(&available, Some(&ActorType::Miner), &mut MockRng);

        assert_eq!(chosen, Some(ActorType::Miner));
        assert_eq!(choose_actor_type(&[], None, &mut MockRng), None);
    }

    #[tokio::test]
    async fn test_full_visit_shows_question_waits_for_answer_then_hides() {
        // Arrange
        let bridge = SessionBridge::new();
        let mut panel_rx = bridge.attach();
        let npc = lifecycle(&bridge, Arc::new(AllowAllSprites), SeededRng::new(3));
        let mut events = npc.subscribe();
        let handle = npc.start();

        // Act
        let (actor_id, _) = next_show(&mut panel_rx).await;
        assert!(bridge.submit_answer("Turn it off and on again"));
        let hide = timeout(WAIT, panel_rx.recv()).await.unwrap().unwrap();

        // Assert
        assert_eq!(hide, DialogueMessage::Hide);
        let mut phases = Vec::new();
        let mut answered = false;
        while phases.last() != Some(&ActorPhase::Despawned) {
            match timeout(WAIT, events.recv()).await.unwrap().unwrap() {
                LifecycleEvent::Phase { actor_id: id, phase, .. } if id == actor_id => {
                    phases.push(phase);
                }
                LifecycleEvent::AnswerReceived { answer, .. } => {
                    answered = answer == "Turn it off and on again";
                }
                _ => {}
            }
        }
        assert_eq!(
            phases,
            vec![
                ActorPhase::Spawning,
                ActorPhase::Approaching,
                ActorPhase::AwaitingAnswer,
                ActorPhase::Departing,
                ActorPhase::Despawned,
            ]
        );
        assert!(answered);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_consecutive_visits_never_repeat_actor_type() {
        let bridge = SessionBridge::new();
        let mut panel_rx = bridge.attach();
        let handle = lifecycle(&bridge, Arc::new(AllowAllSprites), SeededRng::new(11)).start();

        let mut previous: Option<ActorType> = None;
        for _ in 0..20 {
            let (_, actor_type) = next_show(&mut panel_rx).await;
            assert_ne!(Some(&actor_type), previous.as_ref());
            previous = Some(actor_type);
            bridge.submit_answer("An answer");
        }

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_missing_sprites_reselect_a_different_kind() {
        // Arrange: the first pick is the gatherer (index 0), which has no sprites.
        let bridge = SessionBridge::new();
        let mut panel_rx = bridge.attach();
        let npc = lifecycle(
            &bridge,
            Arc::new(MissingSprites(vec![ActorType::Gatherer])),
            SequenceRng::new(vec![0, 0]),
        );
        let mut events = npc.subscribe();
        let handle = npc.start();

        // Act
        let (_, actor_type) = next_show(&mut panel_rx).await;

        // Assert
        assert_eq!(
            timeout(WAIT, events.recv()).await.unwrap().unwrap(),
            LifecycleEvent::ResourceMissing {
                actor_type: ActorType::Gatherer
            }
        );
        assert_eq!(actor_type, ActorType::GraveDigger);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_reselect_after_missing_sprites_still_avoids_previous_kind() {
        // Arrange: the king visits, then the gatherer is picked but has no
        // sprites. Index 2 of the remaining kinds would be the king again if
        // the previous visitor were no longer excluded.
        let bridge = SessionBridge::new();
        let mut panel_rx = bridge.attach();
        let npc = lifecycle(
            &bridge,
            Arc::new(MissingSprites(vec![ActorType::Gatherer])),
            SequenceRng::new(vec![3, 0, 2]),
        );
        let handle = npc.start();

        // Act
        let (_, first) = next_show(&mut panel_rx).await;
        assert!(bridge.submit_answer("An answer"));
        let (_, second) = next_show(&mut panel_rx).await;

        // Assert
        assert_eq!(first, ActorType::King);
        assert_eq!(second, ActorType::Knight);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_while_awaiting_answer_returns_promptly() {
        let bridge = SessionBridge::new();
        let mut panel_rx = bridge.attach();
        let handle = lifecycle(&bridge, Arc::new(AllowAllSprites), SeededRng::new(5)).start();
        next_show(&mut panel_rx).await;

        timeout(WAIT, handle.shutdown()).await.unwrap();

        assert_eq!(bridge.open_session(), None);
    }

    #[tokio::test]
    async fn test_lifecycle_keeps_waiting_without_a_panel() {
        let bridge = SessionBridge::new();
        let npc = lifecycle(&bridge, Arc::new(AllowAllSprites), SeededRng::new(5));
        let mut events = npc.subscribe();
        let handle = npc.start();

        loop {
            if let LifecycleEvent::Phase {
                phase: ActorPhase::AwaitingAnswer,
                ..
            } = timeout(WAIT, events.recv()).await.unwrap().unwrap()
            {
                break;
            }
        }
        assert!(bridge.submit_answer("Late answer"));

        handle.shutdown().await;
    }
}
