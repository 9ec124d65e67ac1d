//! The dialogue panel: the UI side of the session bridge.
//!
//! The panel shows the actor's question, collects the player's answer,
//! has it evaluated and only then releases it to the lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use shopkeep_core::actor::ActorType;
use shopkeep_core::error::DomainError;
use shopkeep_progression::domain::scoring::VillagerReaction;
use tracing::{info, warn};
use uuid::Uuid;

use crate::bridge::{DialogueMessage, SessionBridge};

/// Shown when an answer could not be evaluated. The cause is only logged.
pub const EVALUATION_FAILED_MESSAGE: &str = "The villager could not hear thee. Try again.";

/// Scored feedback returned by the evaluation service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReply {
    pub feedback: String,
    pub score: u32,
    /// Whether the evaluator's reply carried a score at all.
    #[serde(default)]
    pub score_found: bool,
    #[serde(default)]
    pub promoted_to: Option<String>,
}

/// Port to the answer evaluation pipeline.
#[async_trait]
pub trait AnswerEvaluator: Send + Sync {
    /// Scores `answer` to `question`.
    async fn evaluate(&self, question: &str, answer: &str) -> Result<EvaluationReply, DomainError>;
}

/// State of the current answer's evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Pending,
    Success {
        feedback_text: String,
        score: u32,
        score_found: bool,
    },
    Failed { reason: String },
}

impl Evaluation {
    /// Whether the evaluation has finished, successfully or not.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// How the villager takes the answer. Only scored, successful
    /// evaluations produce a reaction.
    #[must_use]
    pub fn reaction(&self) -> Option<VillagerReaction> {
        match self {
            Self::Success {
                score,
                score_found: true,
                ..
            } => Some(VillagerReaction::for_score(*score)),
            _ => None,
        }
    }
}

/// The open dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSession {
    pub actor_id: Uuid,
    pub question: String,
    pub actor_type: ActorType,
    pub answer_draft: String,
    /// Absent until the first submission.
    pub evaluation: Option<Evaluation>,
    submitted_answer: Option<String>,
}

/// The dialogue panel. At most one session is open at a time.
pub struct DialoguePanel {
    bridge: SessionBridge,
    evaluator: Arc<dyn AnswerEvaluator>,
    session: Option<DialogueSession>,
}

impl std::fmt::Debug for DialoguePanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialoguePanel")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl DialoguePanel {
    #[must_use]
    pub fn new(bridge: SessionBridge, evaluator: Arc<dyn AnswerEvaluator>) -> Self {
        Self {
            bridge,
            evaluator,
            session: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> Option<&DialogueSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.session.is_some()
    }

    /// Applies a message from the bridge. `Show` replaces any open session;
    /// `Hide` resets the panel.
    pub fn apply(&mut self, message: DialogueMessage) {
        match message {
            DialogueMessage::Show {
                actor_id,
                question,
                actor_type,
            } => {
                if let Some(previous) = &self.session {
                    info!(previous = %previous.actor_id, replacement = %actor_id, "dialogue replaced");
                }
                self.session = Some(DialogueSession {
                    actor_id,
                    question,
                    actor_type,
                    answer_draft: String::new(),
                    evaluation: None,
                    submitted_answer: None,
                });
            }
            DialogueMessage::Hide => self.session = None,
        }
    }

    /// Replaces the answer draft. Ignored while nothing is shown.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let Some(session) = &mut self.session {
            session.answer_draft = text.into();
        }
    }

    /// Submits the draft for evaluation and waits for the result.
    ///
    /// Returns `None` when no dialogue is open or the draft is blank. A
    /// failed evaluation can be resubmitted.
    pub async fn submit(&mut self) -> Option<&Evaluation> {
        let session = self.session.as_mut()?;
        let answer = session.answer_draft.trim().to_owned();
        if answer.is_empty() {
            return None;
        }

        session.evaluation = Some(Evaluation::Pending);
        let evaluation = match self.evaluator.evaluate(&session.question, &answer).await {
            Ok(reply) => {
                info!(actor_id = %session.actor_id, score = reply.score, "answer evaluated");
                Evaluation::Success {
                    feedback_text: reply.feedback,
                    score: reply.score,
                    score_found: reply.score_found,
                }
            }
            Err(e) => {
                warn!(actor_id = %session.actor_id, error = %e, "answer evaluation failed");
                Evaluation::Failed {
                    reason: EVALUATION_FAILED_MESSAGE.to_owned(),
                }
            }
        };

        session.answer_draft.clear();
        session.submitted_answer = Some(answer);
        session.evaluation = Some(evaluation);
        session.evaluation.as_ref()
    }

    /// Dismisses the evaluation and releases the answer to the lifecycle.
    ///
    /// Does nothing until an evaluation has settled. Returns whether the
    /// lifecycle received the answer.
    pub fn dismiss(&mut self) -> bool {
        let Some(session) = &mut self.session else {
            return false;
        };
        if !session.evaluation.as_ref().is_some_and(Evaluation::is_settled) {
            return false;
        }
        let Some(answer) = session.submitted_answer.take() else {
            return false;
        };
        self.bridge.submit_answer(answer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct CannedEvaluator {
        replies: Mutex<Vec<Result<EvaluationReply, DomainError>>>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl CannedEvaluator {
        fn new(replies: Vec<Result<EvaluationReply, DomainError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AnswerEvaluator for CannedEvaluator {
        async fn evaluate(
            &self,
            question: &str,
            answer: &str,
        ) -> Result<EvaluationReply, DomainError> {
            self.seen
                .lock()
                .unwrap()
                .push((question.to_owned(), answer.to_owned()));
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn reply(score: u32) -> Result<EvaluationReply, DomainError> {
        Ok(EvaluationReply {
            feedback: format!("Score: {score}\nFeedback: So it is."),
            score,
            score_found: true,
            promoted_to: None,
        })
    }

    fn show(question: &str) -> DialogueMessage {
        DialogueMessage::Show {
            actor_id: Uuid::new_v4(),
            question: question.to_owned(),
            actor_type: ActorType::Knight,
        }
    }

    #[tokio::test]
    async fn test_submit_then_dismiss_releases_answer_to_lifecycle() {
        // Arrange
        let bridge = SessionBridge::new();
        let slot = bridge.install_answer_slot();
        let evaluator = Arc::new(CannedEvaluator::new(vec![reply(80)]));
        let mut panel = DialoguePanel::new(bridge, evaluator.clone());
        panel.apply(show("How might one vanquish the dreaded blue screen of death?"));
        panel.set_draft("  Update thy drivers  ");

        // Act
        let evaluation = panel.submit().await.cloned();
        let released = panel.dismiss();

        // Assert
        assert_eq!(
            evaluation.unwrap().reaction(),
            Some(VillagerReaction::Delighted)
        );
        assert!(released);
        assert_eq!(slot.await.unwrap(), "Update thy drivers");
        assert_eq!(evaluator.seen.lock().unwrap()[0].1, "Update thy drivers");
    }

    #[tokio::test]
    async fn test_dismiss_before_evaluation_does_nothing() {
        let bridge = SessionBridge::new();
        let _slot = bridge.install_answer_slot();
        let mut panel = DialoguePanel::new(bridge, Arc::new(CannedEvaluator::new(vec![])));
        panel.apply(show("Why?"));
        panel.set_draft("Because");

        assert!(!panel.dismiss());
    }

    #[tokio::test]
    async fn test_blank_draft_is_not_submitted() {
        let evaluator = Arc::new(CannedEvaluator::new(vec![]));
        let mut panel = DialoguePanel::new(SessionBridge::new(), evaluator.clone());
        panel.apply(show("Why?"));
        panel.set_draft("   ");

        assert!(panel.submit().await.is_none());
        assert!(evaluator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_evaluation_can_be_retried() {
        // Arrange
        let evaluator = Arc::new(CannedEvaluator::new(vec![
            Err(DomainError::UpstreamUnavailable("timeout".into())),
            reply(55),
        ]));
        let mut panel = DialoguePanel::new(SessionBridge::new(), evaluator);
        panel.apply(show("Why?"));

        // Act
        panel.set_draft("First try");
        let first = panel.submit().await.cloned();
        panel.set_draft("Second try");
        let second = panel.submit().await.cloned();

        // Assert
        assert!(matches!(first, Some(Evaluation::Failed { .. })));
        assert_eq!(
            second.unwrap().reaction(),
            Some(VillagerReaction::Pondering)
        );
    }

    #[tokio::test]
    async fn test_unscored_reply_shows_feedback_without_reaction() {
        // Arrange
        let bridge = SessionBridge::new();
        let slot = bridge.install_answer_slot();
        let evaluator = Arc::new(CannedEvaluator::new(vec![Ok(EvaluationReply {
            feedback: "The elder merely nods.".to_owned(),
            score: 0,
            score_found: false,
            promoted_to: None,
        })]));
        let mut panel = DialoguePanel::new(bridge, evaluator);
        panel.apply(show("Why?"));
        panel.set_draft("Because");

        // Act
        let evaluation = panel.submit().await.cloned().unwrap();

        // Assert
        assert!(matches!(
            &evaluation,
            Evaluation::Success { feedback_text, .. } if feedback_text == "The elder merely nods."
        ));
        assert_eq!(evaluation.reaction(), None);
        assert!(panel.dismiss());
        assert_eq!(slot.await.unwrap(), "Because");
    }

    #[tokio::test]
    async fn test_failed_evaluation_hides_transport_detail() {
        let evaluator = Arc::new(CannedEvaluator::new(vec![Err(
            DomainError::UpstreamUnavailable(
                "shopkeep api: error sending request for url (http://10.0.0.3:5000/evaluate)".into(),
            ),
        )]));
        let mut panel = DialoguePanel::new(SessionBridge::new(), evaluator);
        panel.apply(show("Why?"));
        panel.set_draft("Because");

        let evaluation = panel.submit().await.cloned();

        assert_eq!(
            evaluation,
            Some(Evaluation::Failed {
                reason: EVALUATION_FAILED_MESSAGE.to_owned()
            })
        );
    }

    #[test]
    fn test_second_show_replaces_session_and_hide_resets() {
        let mut panel =
            DialoguePanel::new(SessionBridge::new(), Arc::new(CannedEvaluator::new(vec![])));

        panel.apply(show("First?"));
        panel.set_draft("draft");
        panel.apply(show("Second?"));

        let session = panel.session().unwrap();
        assert_eq!(session.question, "Second?");
        assert!(session.answer_draft.is_empty());
        assert!(session.evaluation.is_none());

        panel.apply(DialogueMessage::Hide);
        assert!(!panel.is_visible());
    }
}
