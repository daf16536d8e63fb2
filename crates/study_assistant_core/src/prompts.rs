//! crates/study_assistant_core/src/prompts.rs
//!
//! Fixed prompt templates. The source text is always embedded last and always
//! comes in as a `SourceText`, so it is already bounded.

use crate::domain::SourceText;

/// The system instruction every request is sent with.
pub const STUDY_ASSISTANT_INSTRUCTIONS: &str = "You are an expert study assistant and exam creator. Your goal is to help students learn by generating summaries and quizzes from provided text.";

const SUMMARY_TEMPLATE: &str = r#"Please generate a comprehensive, structured, and learning-optimized summary of the following text.

Rules:
- Use clear headings and bullet points.
- Highlight key concepts and definitions.
- Make it easy for a student to review.
- Format in Markdown.

Text to summarize:
{text}"#;

const QUIZ_TEMPLATE: &str = r#"Create a quiz based on the following text.

Rules:
- Create 5 Multiple Choice Questions (MCQs).
- Create 2 Short Answer questions.
- Every question carries its own answer.
- Output the result strictly in JSON format, with no surrounding prose, using the following schema:
{
    "questions": [
        {
            "id": 1,
            "type": "mcq",
            "question": "...",
            "options": ["A", "B", "C", "D"],
            "answer": "Correct Option"
        },
        {
            "id": 6,
            "type": "short_answer",
            "question": "...",
            "answer": "Expected answer"
        }
    ]
}
- Only "mcq" questions have an "options" field.

Text for quiz:
{text}"#;

pub fn summary_prompt(source: &SourceText) -> String {
    SUMMARY_TEMPLATE.replace("{text}", source.as_str())
}

pub fn quiz_prompt(source: &SourceText) -> String {
    QUIZ_TEMPLATE.replace("{text}", source.as_str())
}
