//! Wire types for the counsel API.

use bytes::Bytes;
use counsel_core::{DocItem, DocumentContent};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;

// ============================================================================
// Streaming request bodies
// ============================================================================

/// Body of `POST /api/ask-question`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskQuestionRequest {
    /// Documents to ground the answer in.
    pub document_ids: Vec<String>,
    /// The question.
    pub question: String,
}

/// Body of `POST /api/compare-documents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareDocumentsRequest {
    /// Documents to compare (at least two).
    pub document_ids: Vec<String>,
    /// What to compare on; `null` lets the server choose.
    pub comparison_criteria: Option<String>,
}

/// Body of `POST /api/ask-law-question`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskLawQuestionRequest {
    /// The question.
    pub question: String,
    /// Jurisdiction, e.g. `"nepal"`, `"usa"`, `"general"`.
    pub jurisdiction: String,
    /// Number of law chunks to retrieve.
    pub top_k: u32,
}

/// Body of `POST /api/review-contract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewContractRequest {
    /// The contract to review.
    pub document_id: String,
}

/// A request answered with an SSE stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRequest {
    /// Grounded question over documents.
    AskQuestion(AskQuestionRequest),
    /// Document comparison.
    CompareDocuments(CompareDocumentsRequest),
    /// General legal question.
    AskLawQuestion(AskLawQuestionRequest),
    /// Contract review.
    ReviewContract(ReviewContractRequest),
}

impl StreamRequest {
    /// Path of the endpoint serving this request.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::AskQuestion(_) => "/api/ask-question",
            Self::CompareDocuments(_) => "/api/compare-documents",
            Self::AskLawQuestion(_) => "/api/ask-law-question",
            Self::ReviewContract(_) => "/api/review-contract",
        }
    }

    /// JSON body of this request.
    pub fn body(&self) -> Result<JsonValue, serde_json::Error> {
        match self {
            Self::AskQuestion(r) => serde_json::to_value(r),
            Self::CompareDocuments(r) => serde_json::to_value(r),
            Self::AskLawQuestion(r) => serde_json::to_value(r),
            Self::ReviewContract(r) => serde_json::to_value(r),
        }
    }
}

// ============================================================================
// Uploads
// ============================================================================

/// A file to send to `POST /api/upload-document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    /// Filename reported to the server.
    pub filename: String,
    /// File contents.
    pub bytes: Bytes,
    /// MIME type of the file part.
    pub mime_type: Option<String>,
    /// Free-text description sent as the `metadata` field.
    pub metadata: Option<String>,
}

impl DocumentUpload {
    /// Create an upload from in-memory bytes.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
            mime_type: None,
            metadata: None,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self::new(filename, bytes))
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }
}

// ============================================================================
// Non-streaming responses
// ============================================================================

/// Response of `GET /api/documents`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentsResponse {
    /// Whether the call succeeded.
    #[serde(default)]
    pub success: bool,
    /// The library.
    #[serde(default)]
    pub documents: Vec<DocItem>,
}

/// Response of `POST /api/upload-document`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    /// Whether the upload succeeded.
    #[serde(default)]
    pub success: bool,
    /// ID of the stored document.
    #[serde(default)]
    pub document_id: Option<String>,
    /// Error detail on failure.
    #[serde(default)]
    pub detail: Option<JsonValue>,
}

impl UploadResponse {
    /// The server's explanation for a failed upload.
    #[must_use]
    pub fn error_message(&self) -> String {
        let detail = self.detail.as_ref();
        detail
            .and_then(|d| d.pointer("/error/message"))
            .and_then(JsonValue::as_str)
            .or_else(|| detail.and_then(JsonValue::as_str))
            .unwrap_or("Upload failed")
            .to_string()
    }
}

/// The `document` object of `GET /api/document/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentBody {
    /// Filename.
    #[serde(default)]
    pub filename: Option<String>,
    /// Extracted full text.
    #[serde(default)]
    pub full_text: Option<String>,
    /// Raw content, used when `full_text` is absent or empty.
    #[serde(default)]
    pub content: Option<String>,
}

/// Response of `GET /api/document/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentResponse {
    /// Whether the call succeeded.
    #[serde(default)]
    pub success: bool,
    /// The document.
    #[serde(default)]
    pub document: Option<DocumentBody>,
}

impl DocumentResponse {
    /// Convert into viewable content, if the server returned a document.
    #[must_use]
    pub fn into_content(self, id: &str) -> Option<DocumentContent> {
        if !self.success {
            return None;
        }
        let document = self.document?;
        Some(DocumentContent {
            id: id.to_string(),
            filename: document.filename.unwrap_or_default(),
            content: document
                .full_text
                .filter(|text| !text.is_empty())
                .or(document.content)
                .unwrap_or_default(),
        })
    }
}

/// A bare `{success}` response.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SuccessResponse {
    /// Whether the call succeeded.
    #[serde(default)]
    pub success: bool,
}
