//! services/api/src/assistant.rs
//!
//! The study assistant: builds the summary and quiz prompts, sends them to the
//! configured language model and normalizes whatever comes back into a value the
//! caller can always display. Apart from `try_summarize`, generation never
//! returns an error; failures are folded into the output string.

use crate::adapters::OpenAiChatAdapter;
use crate::config::{Config, ConfigError};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::thread;
use study_assistant_core::{
    ports::{LanguageModelService, PortError, PortResult},
    prompts::{self, STUDY_ASSISTANT_INSTRUCTIONS},
    quiz_parsing::quiz_payload,
    SourceText,
};
use tracing::{error, info};

/// Prefix of the string returned when a summary could not be generated.
pub const SUMMARY_ERROR_PREFIX: &str = "Error generating summary:";

/// The orchestrator. Cheap to clone; share one instance across handlers.
#[derive(Clone)]
pub struct StudyAssistant {
    llm: Arc<dyn LanguageModelService>,
}

impl StudyAssistant {
    pub fn new(llm: Arc<dyn LanguageModelService>) -> Self {
        Self { llm }
    }

    /// Builds the assistant on top of the OpenAI-compatible adapter.
    ///
    /// Fails before any client is created when the API key is not configured.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?;
        let adapter =
            OpenAiChatAdapter::connect(api_key, &config.llm_base_url, config.llm_model.clone());
        info!(
            "Study assistant bound to model {} at {}",
            config.llm_model, config.llm_base_url
        );
        Ok(Self::new(Arc::new(adapter)))
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    //=====================================================================================
    // Async API
    //=====================================================================================

    /// Generates a Markdown study summary, keeping the failure typed.
    pub async fn try_summarize(&self, source: &SourceText) -> PortResult<String> {
        let prompt = prompts::summary_prompt(source);
        self.llm
            .complete(STUDY_ASSISTANT_INSTRUCTIONS, &prompt)
            .await
            .inspect_err(|e| error!("Summary generation failed: {}", e))
    }

    /// Generates a Markdown study summary. On failure returns a string starting
    /// with `SUMMARY_ERROR_PREFIX`.
    pub async fn summarize(&self, source: &SourceText) -> String {
        self.try_summarize(source)
            .await
            .unwrap_or_else(|e| summary_error(&e))
    }

    /// Generates a quiz. On success returns the model output as-is when it is
    /// already JSON, else with its code fences removed; on failure returns
    /// `{"error": "<message>"}`.
    pub async fn create_quiz(&self, source: &SourceText) -> String {
        let prompt = prompts::quiz_prompt(source);
        match self.llm.complete(STUDY_ASSISTANT_INSTRUCTIONS, &prompt).await {
            Ok(raw) => quiz_payload(&raw).to_string(),
            Err(e) => {
                error!("Quiz generation failed: {}", e);
                quiz_error(&e)
            }
        }
    }

    //=====================================================================================
    // Blocking API
    //=====================================================================================

    /// Blocking form of [`summarize`](Self::summarize). Safe to call from inside
    /// a running tokio runtime.
    pub fn generate_summary(&self, text: &str) -> String {
        let assistant = self.clone();
        let source = SourceText::new(text);
        run_blocking(async move { assistant.summarize(&source).await })
            .unwrap_or_else(|e| summary_error(&e))
    }

    /// Blocking form of [`create_quiz`](Self::create_quiz). Safe to call from
    /// inside a running tokio runtime.
    pub fn generate_quiz(&self, text: &str) -> String {
        let assistant = self.clone();
        let source = SourceText::new(text);
        run_blocking(async move { assistant.create_quiz(&source).await })
            .unwrap_or_else(|e| quiz_error(&e))
    }
}

/// The displayable text for a failed summary.
pub fn summary_error(e: &PortError) -> String {
    format!("{} {}", SUMMARY_ERROR_PREFIX, e)
}

fn quiz_error(e: &PortError) -> String {
    json!({ "error": e.to_string() }).to_string()
}

/// Drives a future to completion on a dedicated thread with its own
/// current-thread runtime, then joins it. Because the runtime never lives on the
/// caller's thread, this works whether or not the caller is already inside one.
fn run_blocking<F, T>(future: F) -> PortResult<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let worker = thread::Builder::new()
        .name("study-assistant-call".to_string())
        .spawn(move || {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map(|runtime| runtime.block_on(future))
        })
        .map_err(|e| PortError::Unexpected(format!("failed to spawn worker thread: {}", e)))?;

    match worker.join() {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(PortError::Unexpected(format!(
            "failed to build async runtime: {}",
            e
        ))),
        Err(_) => Err(PortError::Unexpected(
            "worker thread panicked while waiting for the model".to_string(),
        )),
    }
}
