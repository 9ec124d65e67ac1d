//! Recovery of prompt strings from free-form generator output.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use shopkeep_core::error::DomainError;

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+\s*[.):-]|[-*\x{2022}])\s*(.+?)\s*$").expect("list item pattern is valid")
});

/// Extracts questions from a generator reply.
///
/// Accepts a JSON array of strings, a JSON object with a `questions` array,
/// or numbered / bulleted lines. Plain lines ending in `?` are kept as well.
/// The result is trimmed, unquoted and de-duplicated in first-seen order.
///
/// # Errors
///
/// Returns `DomainError::MalformedUpstreamOutput` if no question survives.
pub fn parse_generated_questions(raw: &str) -> Result<Vec<String>, DomainError> {
    let body = strip_code_fence(raw.trim());

    let candidates = parse_json(body).unwrap_or_else(|| parse_lines(body));
    let questions = dedupe(candidates);

    if questions.is_empty() {
        return Err(DomainError::MalformedUpstreamOutput(
            "no questions found in generator reply".to_owned(),
        ));
    }
    Ok(questions)
}

/// Trims, unquotes and de-duplicates `candidates`, dropping blanks.
#[must_use]
pub fn dedupe(candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|c| clean(&c))
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

fn strip_code_fence(body: &str) -> &str {
    let Some(rest) = body.strip_prefix("```") else {
        return body;
    };
    let rest = rest.split_once('\n').map_or("", |(_, tail)| tail);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_json(body: &str) -> Option<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let array = match &value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(map) => map.get("questions")?.as_array()?,
        _ => return None,
    };
    Some(
        array
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
    )
}

fn parse_lines(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            if let Some(captures) = LIST_ITEM.captures(line) {
                return captures.get(1).map(|m| m.as_str().to_owned());
            }
            let trimmed = line.trim();
            trimmed.ends_with('?').then(|| trimmed.to_owned())
        })
        .collect()
}

fn clean(candidate: &str) -> String {
    candidate
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '\u{201c}' | '\u{201d}'))
        .trim()
        .to_owned()
}
