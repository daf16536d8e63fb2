//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API
//! server.

use serde::Serialize;
use serde_json::Value;
use study_assistant_core::{
    domain::{REQUESTED_MCQ_COUNT, REQUESTED_SHORT_ANSWER_COUNT},
    QuestionKind, Quiz, QuizOutcome,
};
use utoipa::ToSchema;
use uuid::Uuid;

pub const UNEXPECTED_FORMAT_WARNING: &str = "Quiz format unexpected. Displaying raw output.";
pub const UNPARSEABLE_WARNING: &str = "Failed to parse quiz JSON. Displaying raw output.";

//=========================================================================================
// Upload
//=========================================================================================

/// Sent after a document was uploaded and its text extracted.
#[derive(Serialize, ToSchema, Debug)]
pub struct UploadResponse {
    pub document_id: Uuid,
    pub file_name: String,
    /// Characters of text that will be sent to the model.
    pub char_count: usize,
    /// True when the extracted text was longer than the model input bound.
    pub truncated: bool,
}

//=========================================================================================
// Summary
//=========================================================================================

#[derive(Serialize, ToSchema, Debug)]
pub struct SummaryResponse {
    pub document_id: Uuid,
    /// Markdown, or an error message when `failed` is set.
    pub summary: String,
    pub failed: bool,
}

//=========================================================================================
// Quiz
//=========================================================================================

/// How far the quiz output could be interpreted.
#[derive(Serialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    /// A `questions` list was found.
    Structured,
    /// Valid JSON without a `questions` list.
    Unexpected,
    /// Not JSON at all.
    Unstructured,
    /// Generation failed.
    Failed,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct QuizResponse {
    pub document_id: Uuid,
    pub status: QuizStatus,
    /// The parsed quiz, present when `status` is `structured`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub quiz: Option<Quiz>,
    /// Any other JSON the model returned, present when `status` is `unexpected`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    /// The generator output after fence stripping, as written to `quiz.json`.
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl QuizResponse {
    pub fn from_outcome(document_id: Uuid, raw: String, outcome: QuizOutcome) -> Self {
        let (status, quiz, data, warning) = match outcome {
            QuizOutcome::Structured(quiz) => {
                let warning = shape_warning(&quiz);
                (QuizStatus::Structured, Some(quiz), None, warning)
            }
            QuizOutcome::Unexpected(value) => (
                QuizStatus::Unexpected,
                None,
                Some(value),
                Some(UNEXPECTED_FORMAT_WARNING.to_string()),
            ),
            QuizOutcome::Unstructured(_) => (
                QuizStatus::Unstructured,
                None,
                None,
                Some(UNPARSEABLE_WARNING.to_string()),
            ),
            QuizOutcome::Failed(message) => (
                QuizStatus::Failed,
                None,
                None,
                Some(format!("Error generating quiz: {}", message)),
            ),
        };

        Self {
            document_id,
            status,
            quiz,
            data,
            raw,
            warning,
        }
    }
}

/// Question counts are not enforced, only reported.
fn shape_warning(quiz: &Quiz) -> Option<String> {
    if quiz.matches_requested_shape() {
        return None;
    }
    Some(format!(
        "Expected {} multiple-choice and {} short-answer questions, got {} and {} out of {}.",
        REQUESTED_MCQ_COUNT,
        REQUESTED_SHORT_ANSWER_COUNT,
        quiz.count_of(&QuestionKind::MultipleChoice),
        quiz.count_of(&QuestionKind::ShortAnswer),
        quiz.len()
    ))
}
