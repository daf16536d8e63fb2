//! crates/study_assistant_core/src/quiz_parsing.rs
//!
//! Turns the raw text a language model returns for a quiz request into a
//! `QuizOutcome`. Models like to wrap JSON in Markdown code fences or add prose
//! around it, so parsing is a small ladder: strict JSON, then the contents of the
//! first fenced block, then give up and keep the text.

use crate::domain::{Quiz, QuizOutcome};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// A block explicitly tagged as JSON. Tags such as `jsonc` or `jsonl` do not count.
static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\b[ \t]*\r?\n?(.*?)```").expect("valid regex"));

/// Any fenced block. An info string is only consumed when it ends the line.
static ANY_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z0-9_+.-]*[ \t]*\r?\n)?(.*?)```").expect("valid regex")
});

/// Returns the contents of the first ```` ```json ```` block, else of the first
/// bare ```` ``` ```` block, else the trimmed input. Idempotent.
pub fn strip_code_fences(raw: &str) -> &str {
    JSON_FENCE
        .captures(raw)
        .or_else(|| ANY_FENCE.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| raw.trim())
}

/// Returns the JSON payload of a quiz reply: the trimmed reply itself when it
/// already parses, otherwise the fence-stripped text. Valid JSON is never cut,
/// even when its string values contain backtick fences.
pub fn quiz_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    if serde_json::from_str::<Value>(trimmed).is_ok() {
        trimmed
    } else {
        strip_code_fences(raw)
    }
}

/// Interprets a quiz response.
pub fn parse_quiz_response(raw: &str) -> QuizOutcome {
    let value = match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => value,
        Err(_) => {
            let inner = strip_code_fences(raw);
            match serde_json::from_str::<Value>(inner) {
                Ok(value) => value,
                Err(_) => return QuizOutcome::Unstructured(inner.to_string()),
            }
        }
    };
    interpret(value)
}

fn interpret(value: Value) -> QuizOutcome {
    if let Some(quiz) = Quiz::from_value(&value) {
        return QuizOutcome::Structured(quiz);
    }
    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return QuizOutcome::Failed(message);
    }
    QuizOutcome::Unexpected(value)
}
