//! services/api/src/storage.rs
//!
//! Writes uploads, the latest extracted text and generated artifacts under one
//! root directory. Uploads are keyed by document id; everything else lives at a
//! fixed path and is overwritten, so this is a last-result cache, not a store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const UPLOADS_DIR: &str = "uploads";
const RAW_TEXT_PATH: &str = "database/temp/raw_text.txt";
const SUMMARY_PATH: &str = "outputs/summary.md";
const QUIZ_PATH: &str = "outputs/quiz.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid upload file name: {0:?}")]
    InvalidFileName(String),
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_text_path(&self) -> PathBuf {
        self.root.join(RAW_TEXT_PATH)
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_PATH)
    }

    pub fn quiz_path(&self) -> PathBuf {
        self.root.join(QUIZ_PATH)
    }

    /// Saves an uploaded document as `uploads/<id>-<name>`, keeping only the
    /// final component of the client-supplied name. Returns the saved path.
    pub fn save_upload(
        &self,
        id: Uuid,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let name = sanitize_file_name(file_name)
            .ok_or_else(|| StorageError::InvalidFileName(file_name.to_string()))?;
        let path = self
            .root
            .join(UPLOADS_DIR)
            .join(format!("{}-{}", id, name));
        write_file(&path, bytes)?;
        Ok(path)
    }

    pub fn save_raw_text(&self, text: &str) -> Result<PathBuf, StorageError> {
        let path = self.raw_text_path();
        write_file(&path, text.as_bytes())?;
        Ok(path)
    }

    pub fn save_summary(&self, summary: &str) -> Result<PathBuf, StorageError> {
        let path = self.summary_path();
        write_file(&path, summary.as_bytes())?;
        Ok(path)
    }

    pub fn save_quiz(&self, quiz: &str) -> Result<PathBuf, StorageError> {
        let path = self.quiz_path();
        write_file(&path, quiz.as_bytes())?;
        Ok(path)
    }
}

/// Reduces a client-supplied name to its last path component, handling both
/// separator styles.
fn sanitize_file_name(file_name: &str) -> Option<&str> {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    let to_error = |source: io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, contents).map_err(to_error)?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
