//! The session bridge between the NPC lifecycle and the dialogue panel.
//!
//! The lifecycle pushes `show`/`hide` messages to whichever panel is
//! attached and parks on a single-use answer slot; the panel fills the slot
//! once the player is done. Both sides only ever hold a cloned handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopkeep_core::actor::ActorType;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

/// Message from the lifecycle to the dialogue panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueMessage {
    /// Open (or replace) the dialogue for an actor.
    Show {
        actor_id: Uuid,
        question: String,
        actor_type: ActorType,
    },
    /// Close the open dialogue.
    Hide,
}

/// Receiving end handed to the attached panel.
pub type DialogueReceiver = mpsc::UnboundedReceiver<DialogueMessage>;

#[derive(Debug, Default)]
struct BridgeState {
    panel: Option<mpsc::UnboundedSender<DialogueMessage>>,
    answer_slot: Option<oneshot::Sender<String>>,
    open_session: Option<Uuid>,
}

/// Cloneable handle to the bridge.
#[derive(Debug, Clone, Default)]
pub struct SessionBridge {
    state: Arc<Mutex<BridgeState>>,
}

impl SessionBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attaches a panel, replacing any previous one.
    pub fn attach(&self) -> DialogueReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state().panel = Some(tx);
        debug!("dialogue panel attached");
        rx
    }

    /// Detaches the panel. Later `show`/`hide` calls are no-ops.
    pub fn detach(&self) {
        self.state().panel = None;
        debug!("dialogue panel detached");
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state().panel.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// The actor whose dialogue is open, if any.
    #[must_use]
    pub fn open_session(&self) -> Option<Uuid> {
        self.state().open_session
    }

    fn deliver(state: &mut BridgeState, message: DialogueMessage) -> bool {
        let Some(panel) = &state.panel else {
            return false;
        };
        if panel.send(message).is_err() {
            state.panel = None;
            debug!("dialogue panel went away, detaching");
            return false;
        }
        true
    }

    /// Opens the dialogue for `actor_id`. A session that is already open is
    /// replaced. Returns `false` when no panel is attached.
    pub fn show(&self, actor_id: Uuid, question: impl Into<String>, actor_type: ActorType) -> bool {
        let mut state = self.state();
        if let Some(previous) = state.open_session {
            info!(%previous, replacement = %actor_id, "replacing open dialogue session");
        }
        let delivered = Self::deliver(
            &mut state,
            DialogueMessage::Show {
                actor_id,
                question: question.into(),
                actor_type,
            },
        );
        if delivered {
            state.open_session = Some(actor_id);
        }
        delivered
    }

    /// Closes the open dialogue. Returns `false` when nothing was open or no
    /// panel is attached.
    pub fn hide(&self) -> bool {
        let mut state = self.state();
        if state.open_session.take().is_none() {
            return false;
        }
        Self::deliver(&mut state, DialogueMessage::Hide)
    }

    /// Installs a fresh answer slot and returns its receiving end. A slot
    /// that was still pending is dropped, so its receiver sees cancellation.
    pub fn install_answer_slot(&self) -> oneshot::Receiver<String> {
        let (tx, rx) = oneshot::channel();
        if self.state().answer_slot.replace(tx).is_some() {
            debug!("pending answer slot replaced");
        }
        rx
    }

    /// Fills the answer slot. Returns `false` if there was no slot or its
    /// receiver is gone; the slot is cleared either way.
    pub fn submit_answer(&self, answer: impl Into<String>) -> bool {
        let Some(slot) = self.state().answer_slot.take() else {
            debug!("answer submitted with no pending slot");
            return false;
        };
        slot.send(answer.into()).is_ok()
    }
}
