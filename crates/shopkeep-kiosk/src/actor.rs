//! The NPC at the counter and its lifecycle phase.

use std::fmt;

use serde::Serialize;
use shopkeep_core::actor::ActorType;
use shopkeep_core::error::DomainError;
use uuid::Uuid;

/// Where an actor is in its visit to the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorPhase {
    Spawning,
    Approaching,
    AwaitingAnswer,
    Departing,
    Despawned,
}

impl ActorPhase {
    /// The phase that follows this one, `None` once despawned.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Spawning => Some(Self::Approaching),
            Self::Approaching => Some(Self::AwaitingAnswer),
            Self::AwaitingAnswer => Some(Self::Departing),
            Self::Departing => Some(Self::Despawned),
            Self::Despawned => None,
        }
    }
}

impl fmt::Display for ActorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spawning => "spawning",
            Self::Approaching => "approaching",
            Self::AwaitingAnswer => "awaitingAnswer",
            Self::Departing => "departing",
            Self::Despawned => "despawned",
        };
        f.write_str(name)
    }
}

/// One spawned NPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Correlates bridge traffic with this actor.
    pub id: Uuid,
    /// The actor's kind.
    pub actor_type: ActorType,
    phase: ActorPhase,
    assigned_question: Option<String>,
    assigned_answer: Option<String>,
}

impl Actor {
    /// Spawns an actor of `actor_type`.
    #[must_use]
    pub fn new(actor_type: ActorType) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_type,
            phase: ActorPhase::Spawning,
            assigned_question: None,
            assigned_answer: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ActorPhase {
        self.phase
    }

    #[must_use]
    pub fn assigned_question(&self) -> Option<&str> {
        self.assigned_question.as_deref()
    }

    #[must_use]
    pub fn assigned_answer(&self) -> Option<&str> {
        self.assigned_answer.as_deref()
    }

    /// Moves to the next phase.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the actor is already
    /// despawned, or if it would leave `Approaching` without a question.
    pub fn advance(&mut self) -> Result<ActorPhase, DomainError> {
        let next = self.phase.next().ok_or_else(|| {
            DomainError::InvalidInput(format!("actor {} is already despawned", self.id))
        })?;
        if next == ActorPhase::AwaitingAnswer && self.assigned_question.is_none() {
            return Err(DomainError::InvalidInput(format!(
                "actor {} cannot await an answer without a question",
                self.id
            )));
        }
        self.phase = next;
        Ok(next)
    }

    /// Gives the actor its question. Only meaningful while approaching.
    pub fn assign_question(&mut self, question: impl Into<String>) {
        self.assigned_question = Some(question.into());
    }

    /// Records the player's answer.
    pub fn receive_answer(&mut self, answer: impl Into<String>) {
        self.assigned_answer = Some(answer.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_walks_every_phase_in_order() {
        let mut actor = Actor::new(ActorType::Merchant);
        assert_eq!(actor.phase(), ActorPhase::Spawning);

        assert_eq!(actor.advance().unwrap(), ActorPhase::Approaching);
        actor.assign_question("Wherefore do mine online transactions fail?");
        assert_eq!(actor.advance().unwrap(), ActorPhase::AwaitingAnswer);
        actor.receive_answer("Check thy card's expiry.");
        assert_eq!(actor.advance().unwrap(), ActorPhase::Departing);
        assert_eq!(actor.advance().unwrap(), ActorPhase::Despawned);

        assert!(actor.advance().is_err());
        assert_eq!(actor.assigned_answer(), Some("Check thy card's expiry."));
    }

    #[test]
    fn test_cannot_await_answer_without_question() {
        let mut actor = Actor::new(ActorType::Nun);
        actor.advance().unwrap();

        let result = actor.advance();

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert_eq!(actor.phase(), ActorPhase::Approaching);
    }

    #[test]
    fn test_each_actor_gets_a_unique_id() {
        assert_ne!(Actor::new(ActorType::King).id, Actor::new(ActorType::King).id);
    }
}
