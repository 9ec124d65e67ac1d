//! Answer evaluation pipeline.
//!
//! `(question, answer)` goes to the text generator under a fixed contract,
//! the numeric score is pulled out of the free-form reply, and the visitor's
//! profile is credited and promoted in a single update.

use serde::Serialize;
use shopkeep_core::clock::Clock;
use shopkeep_core::command::Command;
use shopkeep_core::error::DomainError;
use shopkeep_core::generation::{GenerationRequest, TextGenerator};
use shopkeep_core::notify::Notifier;
use shopkeep_core::profile::{PlayerProfile, ProfileRepository};
use tracing::{info, warn};

use super::profiles::upsert_profile;
use crate::domain::commands::EvaluateAnswer;
use crate::domain::scoring::{extract_score, is_good_answer};
use crate::domain::titles::TitleTable;

/// Instruction contract for the evaluator.
pub const EVALUATION_SYSTEM_PROMPT: &str = "You are a wise elder of a medieval village judging \
the counsel a shopkeeper gives to villagers about their technology troubles. Rate the answer \
from 0 to 100 for correctness and helpfulness. Reply in exactly this format:\n\
Score: <number>\n\
Feedback: <one or two sentences in a medieval voice>\n\
Suggestion: <one concrete improvement>";

const EVALUATION_TEMPERATURE: f32 = 0.3;
const EVALUATION_MAX_TOKENS: u32 = 300;

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    /// Raw evaluator reply.
    pub feedback: String,
    /// Extracted score, `0` when the reply carried none.
    pub score: u32,
    /// Whether a score label was present in the reply.
    pub score_found: bool,
    /// Whether the answer counted as good.
    pub good_answer: bool,
    /// Title awarded by this answer, if any.
    pub promoted_to: Option<String>,
    /// The updated profile when one was credited.
    #[serde(skip)]
    pub profile: Option<PlayerProfile>,
}

fn milestone_message(title: &str) -> String {
    format!(
        "Hail! Thy counsel at the counter hath earned thee the title of {title}. \
         Reply SCROLL to read thy record."
    )
}

/// Handles `EvaluateAnswer`.
///
/// A reply without a score label is still a successful evaluation, scored
/// `0`, and leaves the profile untouched. So does an anonymous answer.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` if the question or answer is blank
/// (the generator is not called), or `DomainError::UpstreamUnavailable` if
/// the generator or document store fails. Counters are untouched on error.
pub async fn handle_evaluate_answer(
    command: &EvaluateAnswer,
    titles: &TitleTable,
    clock: &dyn Clock,
    generator: &dyn TextGenerator,
    profiles: &dyn ProfileRepository,
    notifier: &dyn Notifier,
) -> Result<EvaluationOutcome, DomainError> {
    let question = command.question.trim();
    let answer = command.answer.trim();
    if question.is_empty() || answer.is_empty() {
        return Err(DomainError::InvalidInput(
            "question and answer must not be empty".to_owned(),
        ));
    }

    let request = GenerationRequest::new(
        EVALUATION_SYSTEM_PROMPT,
        format!("Question: {question}\nAnswer: {answer}"),
    )
    .with_temperature(EVALUATION_TEMPERATURE)
    .with_max_tokens(EVALUATION_MAX_TOKENS);

    let feedback = generator.generate(request).await.inspect_err(|e| {
        warn!(correlation_id = %command.correlation_id(), error = %e, "evaluation failed");
    })?;

    let Some(score) = extract_score(&feedback) else {
        info!(
            correlation_id = %command.correlation_id(),
            "evaluator reply carried no score"
        );
        return Ok(EvaluationOutcome {
            feedback,
            score: 0,
            score_found: false,
            good_answer: false,
            promoted_to: None,
            profile: None,
        });
    };
    let good_answer = is_good_answer(score);

    let Some(visitor_id) = &command.visitor_id else {
        info!(correlation_id = %command.correlation_id(), score, "anonymous answer scored");
        return Ok(EvaluationOutcome {
            feedback,
            score,
            score_found: true,
            good_answer,
            promoted_to: None,
            profile: None,
        });
    };

    let (profile, _, promoted_to) = upsert_profile(visitor_id, titles, clock, profiles, |p, _| {
        p.record_answer(good_answer);
        titles.apply_promotion(p)
    })
    .await?;

    info!(
        correlation_id = %command.correlation_id(),
        %visitor_id,
        score,
        good_answer,
        answer_count = profile.answer_count,
        good_answer_count = profile.good_answer_count,
        promoted_to = promoted_to.as_deref(),
        "answer credited"
    );

    if let (Some(title), Some(phone)) = (&promoted_to, &profile.phone_number) {
        if let Err(e) = notifier.send_sms(phone, &milestone_message(title)).await {
            warn!(%visitor_id, error = %e, "milestone notification failed");
        }
    }

    Ok(EvaluationOutcome {
        feedback,
        score,
        score_found: true,
        good_answer,
        promoted_to,
        profile: Some(profile),
    })
}
