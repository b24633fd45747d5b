//! Uploaded document management.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};
use crate::config::constants::routes;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFile {
    pub id: i64,
    pub filename: String,
    pub content_type: String,
    pub file_size: u64,
    pub upload_date: DateTime<Utc>,
    /// Extracted text; populated on the detail endpoint only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRejection {
    pub filename: String,
    pub error: String,
}

/// Upload result; partial success is not an error, rejected files are
/// listed alongside the accepted ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub files: Vec<DocumentFile>,
    #[serde(default)]
    pub errors: Vec<UploadRejection>,
}

impl ApiClient {
    pub async fn list_files(&self) -> Result<Vec<DocumentFile>, ApiError> {
        self.get_json(routes::files::COLLECTION).await
    }

    pub async fn get_file(&self, id: i64) -> Result<DocumentFile, ApiError> {
        self.get_json(&routes::files::detail(id)).await
    }

    /// Upload one or more local files in a single multipart request, each
    /// under the `file` field.
    pub async fn upload_files(&self, paths: &[PathBuf]) -> Result<UploadOutcome, ApiError> {
        let mut form = Form::new();

        for path in paths {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| ApiError::Network(format!("cannot read {}: {e}", path.display())))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());

            let mut part = Part::bytes(bytes).file_name(filename);
            if let Some(mime) = guess_content_type(path) {
                part = part
                    .mime_str(mime)
                    .map_err(|e| ApiError::Network(format!("invalid content type: {e}")))?;
            }
            form = form.part("file", part);
        }

        self.post_multipart(routes::files::COLLECTION, form).await
    }

    pub async fn delete_file(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&routes::files::detail(id)).await
    }
}

/// Content type by extension for the handful of formats the backend
/// extracts text from; anything else is sent without one.
fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "csv" => Some("text/csv"),
        "html" | "htm" => Some("text/html"),
        "docx" => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        _ => None,
    }
}
