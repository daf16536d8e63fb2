//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::assistant::summary_error;
use crate::storage::StorageError;
use crate::web::protocol::{QuizResponse, QuizStatus, SummaryResponse, UploadResponse};
use crate::web::state::{AppState, CurrentDocument};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use study_assistant_core::{parse_quiz_response, SourceText};
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Returned when the uploaded document yields no text.
pub const EMPTY_EXTRACTION_MESSAGE: &str = "Could not extract text from the document.";
pub const NO_DOCUMENT_MESSAGE: &str = "Upload a document first.";

type HandlerError = (StatusCode, String);

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_document_handler,
        summary_handler,
        quiz_handler,
        health_handler,
    ),
    components(
        schemas(UploadResponse, SummaryResponse, QuizResponse, QuizStatus, HealthResponse)
    ),
    tags(
        (name = "Study Assistant API", description = "Upload a document, then generate a study summary or a quiz from it.")
    )
)]
pub struct ApiDoc;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    model: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Upload a document and extract its text.
///
/// Accepts a multipart/form-data request with exactly one file part; other form
/// fields are ignored. The document replaces any previously uploaded one.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The PDF or text document to upload."),
    responses(
        (status = 201, description = "Document stored and text extracted", body = UploadResponse),
        (status = 400, description = "Bad request (no file part, or more than one)"),
        (status = 422, description = "No text could be extracted from the document"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_document_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        // Plain form fields are ignored; only file parts count.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if upload.is_some() {
            return Err((
                StatusCode::BAD_REQUEST,
                "Multipart form must include exactly one file".to_string(),
            ));
        }
        let data = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read file bytes: {}", e),
            )
        })?;
        upload = Some((file_name, data));
    }

    let (file_name, data) = upload.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        )
    })?;

    let response = ingest_document(&app_state, &file_name, &data).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Saves the upload, extracts its text and makes it the current document.
pub async fn ingest_document(
    app_state: &Arc<AppState>,
    file_name: &str,
    data: &[u8],
) -> Result<UploadResponse, HandlerError> {
    let id = Uuid::new_v4();
    let path = app_state
        .store
        .save_upload(id, file_name, data)
        .map_err(storage_failure)?;
    info!("Saved upload {} ({} bytes)", path.display(), data.len());

    // Extraction is CPU bound and synchronous.
    let extractor = app_state.extractor.clone();
    let extract_path = path.clone();
    let text = tokio::task::spawn_blocking(move || extractor.extract_text(&extract_path))
        .await
        .map_err(|e| {
            error!("Extraction task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Text extraction failed".to_string(),
            )
        })?;

    app_state
        .store
        .save_raw_text(&text)
        .map_err(storage_failure)?;

    let source = SourceText::new(text);
    if source.is_empty() {
        warn!("No text extracted from {}", path.display());
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            EMPTY_EXTRACTION_MESSAGE.to_string(),
        ));
    }

    let document = CurrentDocument::new(id, file_name, source);
    let response = UploadResponse {
        document_id: document.id,
        file_name: document.file_name.clone(),
        char_count: document.text.char_count(),
        truncated: document.text.was_truncated(),
    };
    app_state.replace_document(document).await;
    Ok(response)
}

/// Generate a Markdown study summary of the current document.
#[utoipa::path(
    post,
    path = "/summary",
    responses(
        (status = 200, description = "Summary generated, or the generation error", body = SummaryResponse),
        (status = 409, description = "No document has been uploaded yet")
    )
)]
pub async fn summary_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, HandlerError> {
    let document = require_document(&app_state).await?;

    let result = app_state.assistant.try_summarize(&document.text).await;
    let failed = result.is_err();
    let summary = result.unwrap_or_else(|e| summary_error(&e));
    if let Err(e) = app_state.store.save_summary(&summary) {
        warn!("Could not save summary: {}", e);
    }

    Ok(Json(SummaryResponse {
        document_id: document.id,
        summary,
        failed,
    }))
}

/// Generate a quiz (5 multiple-choice, 2 short-answer) from the current document.
#[utoipa::path(
    post,
    path = "/quiz",
    responses(
        (status = 200, description = "Quiz generated; `status` tells how far it could be parsed", body = QuizResponse),
        (status = 409, description = "No document has been uploaded yet")
    )
)]
pub async fn quiz_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<QuizResponse>, HandlerError> {
    let document = require_document(&app_state).await?;

    let raw = app_state.assistant.create_quiz(&document.text).await;
    if let Err(e) = app_state.store.save_quiz(&raw) {
        warn!("Could not save quiz: {}", e);
    }

    let outcome = parse_quiz_response(&raw);
    let response = QuizResponse::from_outcome(document.id, raw, outcome);
    if let Some(warning) = &response.warning {
        warn!("Quiz for {}: {}", document.file_name, warning);
    }
    Ok(Json(response))
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: app_state.config.llm_model.clone(),
    })
}

//=========================================================================================
// Helpers
//=========================================================================================

async fn require_document(app_state: &AppState) -> Result<CurrentDocument, HandlerError> {
    app_state
        .current_document()
        .await
        .ok_or_else(|| (StatusCode::CONFLICT, NO_DOCUMENT_MESSAGE.to_string()))
}

fn storage_failure(e: StorageError) -> HandlerError {
    match e {
        StorageError::InvalidFileName(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        StorageError::Write { .. } => {
            error!("Storage failure: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store the document".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::StudyAssistant;
    use crate::config::Config;
    use crate::storage::OutputStore;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::CONTENT_TYPE, Request};
    use std::path::Path;
    use tower::ServiceExt;
    use study_assistant_core::ports::{
        LanguageModelService, PortError, PortResult, TextExtractionService,
    };

    struct EchoModel;

    #[async_trait]
    impl LanguageModelService for EchoModel {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, _system: &str, prompt: &str) -> PortResult<String> {
            if prompt.starts_with("Create a quiz") {
                Ok("```json\n{\"questions\": []}\n```".to_string())
            } else {
                Ok("# Summary".to_string())
            }
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModelService for FailingModel {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _system: &str, _prompt: &str) -> PortResult<String> {
            Err(PortError::Provider("invalid API key".to_string()))
        }
    }

    /// Treats the uploaded bytes as UTF-8 text.
    struct RawTextExtractor;

    impl TextExtractionService for RawTextExtractor {
        fn extract_text(&self, path: &Path) -> String {
            std::fs::read_to_string(path).unwrap_or_default().trim().to_string()
        }
    }

    fn state_with(model: Arc<dyn LanguageModelService>, root: &Path) -> Arc<AppState> {
        let config = Config::from_lookup(|_| None).unwrap();
        Arc::new(AppState::new(
            Arc::new(config),
            StudyAssistant::new(model),
            Arc::new(RawTextExtractor),
            OutputStore::new(root),
        ))
    }

    #[tokio::test]
    async fn summary_before_upload_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(EchoModel), dir.path());

        let err = summary_handler(State(state)).await.unwrap_err();
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn empty_document_is_rejected_and_not_made_current() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(EchoModel), dir.path());

        let err = ingest_document(&state, "blank.txt", b"   ").await.unwrap_err();
        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.1, EMPTY_EXTRACTION_MESSAGE);
        assert!(state.current_document().await.is_none());
        let uploads: Vec<_> = std::fs::read_dir(dir.path().join("uploads"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].ends_with("-blank.txt"));
    }

    #[tokio::test]
    async fn upload_then_summary_and_quiz_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(EchoModel), dir.path());

        let upload = ingest_document(&state, "plants.txt", b"Plants make sugar.")
            .await
            .unwrap();
        assert_eq!(upload.char_count, "Plants make sugar.".len());
        assert!(!upload.truncated);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("database/temp/raw_text.txt")).unwrap(),
            "Plants make sugar."
        );

        let Json(summary) = summary_handler(State(state.clone())).await.unwrap();
        assert_eq!(summary.document_id, upload.document_id);
        assert_eq!(summary.summary, "# Summary");
        assert!(!summary.failed);

        let Json(quiz) = quiz_handler(State(state)).await.unwrap();
        assert_eq!(quiz.status, QuizStatus::Structured);
        assert_eq!(quiz.raw, "{\"questions\": []}");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("outputs/quiz.json")).unwrap(),
            "{\"questions\": []}"
        );
    }

    #[tokio::test]
    async fn second_upload_replaces_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(EchoModel), dir.path());

        let first = ingest_document(&state, "a.txt", b"first").await.unwrap();
        let second = ingest_document(&state, "b.txt", b"second").await.unwrap();
        assert_ne!(first.document_id, second.document_id);

        let current = state.current_document().await.unwrap();
        assert_eq!(current.id, second.document_id);
        assert_eq!(current.text.as_str(), "second");
    }

    #[tokio::test]
    async fn provider_failure_still_answers_with_displayable_values() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(FailingModel), dir.path());
        ingest_document(&state, "a.txt", b"text").await.unwrap();

        let Json(summary) = summary_handler(State(state.clone())).await.unwrap();
        assert!(summary.failed);
        assert!(summary.summary.contains("invalid API key"));

        let Json(quiz) = quiz_handler(State(state)).await.unwrap();
        assert_eq!(quiz.status, QuizStatus::Failed);
        assert!(quiz.raw.contains("\"error\""));
    }

    /// Replies to summaries with text that happens to look like a failure.
    struct ErrorLookingModel;

    #[async_trait]
    impl LanguageModelService for ErrorLookingModel {
        fn model_name(&self) -> &str {
            "error-looking"
        }

        async fn complete(&self, _system: &str, _prompt: &str) -> PortResult<String> {
            Ok("Error generating summary: a chapter on exception handling".to_string())
        }
    }

    #[tokio::test]
    async fn summary_failure_comes_from_the_result_not_the_text() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(ErrorLookingModel), dir.path());
        ingest_document(&state, "a.txt", b"text").await.unwrap();

        let Json(summary) = summary_handler(State(state)).await.unwrap();
        assert!(!summary.failed);
        assert!(summary.summary.starts_with(crate::assistant::SUMMARY_ERROR_PREFIX));
    }

    const BOUNDARY: &str = "study-assistant-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a str),
    }

    fn multipart_upload(parts: &[Part]) -> Request<Body> {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match part {
                Part::Text(name, value) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    name, value
                )),
                Part::File(name, file_name, contents) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
                    name, file_name, contents
                )),
            }
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri("/documents")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn upload(state: &Arc<AppState>, parts: &[Part<'_>]) -> (StatusCode, String) {
        let response = crate::web::router(state.clone())
            .oneshot(multipart_upload(parts))
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn upload_without_a_file_part_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(EchoModel), dir.path());

        let (status, body) = upload(&state, &[Part::Text("note", "no file here")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Multipart form must include a file");
        assert!(state.current_document().await.is_none());
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn upload_with_two_files_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(EchoModel), dir.path());

        let (status, body) = upload(
            &state,
            &[
                Part::File("file", "a.txt", "first"),
                Part::File("file", "b.txt", "second"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Multipart form must include exactly one file");
        assert!(state.current_document().await.is_none());
    }

    #[tokio::test]
    async fn text_fields_before_the_file_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(Arc::new(EchoModel), dir.path());

        let (status, body) = upload(
            &state,
            &[
                Part::Text("course", "Biology 101"),
                Part::File("file", "plants.txt", "Plants make sugar."),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let response: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(response["file_name"], "plants.txt");

        let current = state.current_document().await.unwrap();
        assert_eq!(current.file_name, "plants.txt");
        assert_eq!(current.text.as_str(), "Plants make sugar.");
        assert!(dir
            .path()
            .join("uploads")
            .join(format!("{}-plants.txt", current.id))
            .exists());
    }
}
