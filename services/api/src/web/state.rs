//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::assistant::StudyAssistant;
use crate::config::Config;
use crate::storage::OutputStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use study_assistant_core::{ports::TextExtractionService, SourceText};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub assistant: StudyAssistant,
    pub extractor: Arc<dyn TextExtractionService>,
    pub store: OutputStore,
    /// The document the next summary or quiz is generated from. An upload
    /// replaces it.
    pub current_document: RwLock<Option<CurrentDocument>>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        assistant: StudyAssistant,
        extractor: Arc<dyn TextExtractionService>,
        store: OutputStore,
    ) -> Self {
        Self {
            config,
            assistant,
            extractor,
            store,
            current_document: RwLock::new(None),
        }
    }

    /// Returns a snapshot of the current document, if any.
    pub async fn current_document(&self) -> Option<CurrentDocument> {
        self.current_document.read().await.clone()
    }

    pub async fn replace_document(&self, document: CurrentDocument) {
        info!(
            "Current document is now {} ({}, uploaded {})",
            document.file_name,
            document.id,
            document.uploaded_at.to_rfc3339()
        );
        *self.current_document.write().await = Some(document);
    }
}

//=========================================================================================
// CurrentDocument
//=========================================================================================

#[derive(Debug, Clone)]
pub struct CurrentDocument {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub text: SourceText,
}

impl CurrentDocument {
    pub fn new(id: Uuid, file_name: impl Into<String>, text: SourceText) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            uploaded_at: Utc::now(),
            text,
        }
    }
}
