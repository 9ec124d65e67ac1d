//! Server-side question generation.
//!
//! Asks the text generator for a batch of counter questions and always
//! returns a usable list: generated, generated plus defaults, or defaults
//! alone.

use serde::{Deserialize, Serialize};
use shopkeep_core::generation::{GenerationRequest, TextGenerator};
use tracing::{info, warn};

use crate::domain::defaults::default_pool;
use crate::domain::parsing::parse_generated_questions;

/// Batch size used when the caller does not ask for one.
pub const DEFAULT_QUESTION_COUNT: usize = 10;

/// Largest batch a single request may ask for.
pub const MAX_QUESTION_COUNT: usize = 50;

/// Instruction contract for question generation.
pub const QUESTION_SYSTEM_PROMPT: &str = "You write questions for a medieval village help desk. \
Each question is a modern technology problem phrased by a medieval villager in playful \
Shakespearean English, one sentence, ending with a question mark. \
Reply with a JSON array of strings and nothing else.";

/// How the returned list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    /// Every question came from the generator.
    Success,
    /// The generator produced some questions; defaults filled the rest.
    Partial,
    /// The generator failed; the list is the static defaults.
    Fallback,
}

/// A batch of questions ready to hand to a kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestions {
    /// Never empty.
    pub questions: Vec<String>,
    pub status: GenerationStatus,
}

/// Clamps a requested batch size into `1..=MAX_QUESTION_COUNT`.
#[must_use]
pub fn clamp_count(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_QUESTION_COUNT)
        .clamp(1, MAX_QUESTION_COUNT)
}

/// Generates `count` questions.
pub async fn generate_questions(count: usize, generator: &dyn TextGenerator) -> GeneratedQuestions {
    let count = count.clamp(1, MAX_QUESTION_COUNT);
    let request = GenerationRequest::new(
        QUESTION_SYSTEM_PROMPT,
        format!("Write {count} distinct questions."),
    )
    .with_temperature(0.9);

    let reply = match generator.generate(request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "question generation failed, serving defaults");
            return fallback(count);
        }
    };

    let mut questions = match parse_generated_questions(&reply) {
        Ok(questions) => questions,
        Err(e) => {
            warn!(error = %e, "generator reply unusable, serving defaults");
            return fallback(count);
        }
    };

    if questions.len() >= count {
        questions.truncate(count);
        info!(count = questions.len(), "generated question batch");
        return GeneratedQuestions {
            questions,
            status: GenerationStatus::Success,
        };
    }

    let generated = questions.len();
    for default in default_pool() {
        if questions.len() >= count {
            break;
        }
        if !questions.contains(&default) {
            questions.push(default);
        }
    }
    info!(generated, total = questions.len(), "partial question batch topped up with defaults");
    GeneratedQuestions {
        questions,
        status: GenerationStatus::Partial,
    }
}

fn fallback(count: usize) -> GeneratedQuestions {
    let mut questions = default_pool();
    questions.truncate(count.max(1));
    GeneratedQuestions {
        questions,
        status: GenerationStatus::Fallback,
    }
}
