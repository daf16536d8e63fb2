//! services/api/src/bin/study.rs
//!
//! One-shot command line run: `study <document>` extracts the text, then writes
//! the summary and the quiz next to it through the blocking assistant API.

use api_lib::{
    adapters::DocumentTextExtractor,
    assistant::StudyAssistant,
    config::Config,
    error::ApiError,
    storage::OutputStore,
};
use std::path::PathBuf;
use study_assistant_core::{parse_quiz_response, ports::TextExtractionService, QuizOutcome};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let document = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| ApiError::Internal("usage: study <document.pdf>".to_string()))?;

    let assistant = StudyAssistant::from_config(&config)?;
    let store = OutputStore::new(config.output_root.clone());

    let text = DocumentTextExtractor::new().extract_text(&document);
    store.save_raw_text(&text)?;
    if text.is_empty() {
        return Err(ApiError::Internal(format!(
            "Could not extract text from {}",
            document.display()
        )));
    }

    info!("Generating summary with {}...", assistant.model_name());
    let summary = assistant.generate_summary(&text);
    let summary_path = store.save_summary(&summary)?;
    info!("Summary written to {}", summary_path.display());

    info!("Generating quiz...");
    let quiz = assistant.generate_quiz(&text);
    let quiz_path = store.save_quiz(&quiz)?;
    match parse_quiz_response(&quiz) {
        QuizOutcome::Structured(parsed) if parsed.matches_requested_shape() => {
            info!("Quiz with {} questions written to {}", parsed.len(), quiz_path.display())
        }
        QuizOutcome::Structured(parsed) => warn!(
            "Quiz written to {} but has an unexpected mix of {} questions",
            quiz_path.display(),
            parsed.len()
        ),
        QuizOutcome::Failed(message) => warn!("Quiz generation failed: {}", message),
        QuizOutcome::Unexpected(_) | QuizOutcome::Unstructured(_) => warn!(
            "Quiz written to {} but is not in the expected format",
            quiz_path.display()
        ),
    }

    Ok(())
}
