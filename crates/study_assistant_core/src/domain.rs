//! crates/study_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport, file layout or model provider.

use serde::Serialize;
use serde_json::Value;

/// The maximum number of characters of source text ever forwarded to the model.
pub const MAX_SOURCE_CHARS: usize = 30_000;

/// How many questions of each kind the quiz prompt asks for.
pub const REQUESTED_MCQ_COUNT: usize = 5;
pub const REQUESTED_SHORT_ANSWER_COUNT: usize = 2;

//=========================================================================================
// Source Text
//=========================================================================================

/// Plain text extracted from an uploaded document, bounded to `MAX_SOURCE_CHARS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    text: String,
    truncated: bool,
}

impl SourceText {
    /// Wraps extracted text, cutting it down to `MAX_SOURCE_CHARS` characters.
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        let truncated = match text.char_indices().nth(MAX_SOURCE_CHARS) {
            Some((byte_index, _)) => {
                text.truncate(byte_index);
                true
            }
            None => false,
        };
        Self { text, truncated }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// True when the original text was longer than the bound and got cut.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

//=========================================================================================
// Quiz
//=========================================================================================

/// The kind of a quiz question as reported by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice,
    ShortAnswer,
    /// Anything else the model decided to emit.
    Other(String),
}

impl QuestionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mcq" => QuestionKind::MultipleChoice,
            "short_answer" | "short" => QuestionKind::ShortAnswer,
            _ => QuestionKind::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QuestionKind::MultipleChoice => "mcq",
            QuestionKind::ShortAnswer => "short_answer",
            QuestionKind::Other(raw) => raw,
        }
    }
}

impl Serialize for QuestionKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single question lifted out of untrusted model output.
///
/// Every field is optional: the model is asked for a schema but nothing forces it
/// to honour it, so anything missing or of the wrong JSON type is left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuizQuestion {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<QuestionKind>,
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub answer: Option<String>,
}

impl QuizQuestion {
    fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let options = match object.get("options").and_then(Value::as_array) {
            Some(items) if items.iter().all(Value::is_string) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            id: object.get("id").and_then(Value::as_i64),
            kind: object
                .get("type")
                .and_then(Value::as_str)
                .map(QuestionKind::parse),
            question: object
                .get("question")
                .and_then(Value::as_str)
                .map(str::to_string),
            options,
            answer: object.get("answer").and_then(scalar_to_string),
        }
    }

    pub fn is_multiple_choice(&self) -> bool {
        self.kind == Some(QuestionKind::MultipleChoice)
    }
}

/// Answers sometimes come back as numbers or booleans; render those as text.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A quiz as parsed from the model's JSON output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Lifts a quiz out of a JSON value. Returns `None` when there is no
    /// `questions` array at the top level.
    pub fn from_value(value: &Value) -> Option<Self> {
        let questions = value.get("questions")?.as_array()?;
        Some(Self {
            questions: questions.iter().map(QuizQuestion::from_value).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn count_of(&self, kind: &QuestionKind) -> usize {
        self.questions
            .iter()
            .filter(|q| q.kind.as_ref() == Some(kind))
            .count()
    }

    /// Whether the quiz has exactly the question mix the prompt requests.
    pub fn matches_requested_shape(&self) -> bool {
        self.len() == REQUESTED_MCQ_COUNT + REQUESTED_SHORT_ANSWER_COUNT
            && self.count_of(&QuestionKind::MultipleChoice) == REQUESTED_MCQ_COUNT
            && self.count_of(&QuestionKind::ShortAnswer) == REQUESTED_SHORT_ANSWER_COUNT
    }
}

/// The result of interpreting a quiz response.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizOutcome {
    /// A `questions` list was found and lifted.
    Structured(Quiz),
    /// Valid JSON, but not shaped like a quiz.
    Unexpected(Value),
    /// Not JSON, even after removing code fences. Carries the cleaned text.
    Unstructured(String),
    /// The generator reported a failure through an `{"error": ...}` object.
    Failed(String),
}
