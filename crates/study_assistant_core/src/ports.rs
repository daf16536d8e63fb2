//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of a specific model provider or document format.

use async_trait::async_trait;
use std::path::Path;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, provider).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Empty response: {0}")]
    EmptyResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// The model identifier every request is sent to.
    fn model_name(&self) -> &str;

    /// Sends one system instruction and one user prompt, returning the reply text.
    /// No conversation history is kept between calls.
    async fn complete(&self, system: &str, prompt: &str) -> PortResult<String>;
}

pub trait TextExtractionService: Send + Sync {
    /// Extracts plain text from the document at `path`.
    ///
    /// Never fails outward: any problem degrades to an empty string.
    fn extract_text(&self, path: &Path) -> String;
}
