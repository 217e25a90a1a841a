//! Uploaded document types.

use serde::{Deserialize, Serialize};

/// Shown when a document has neither full text nor a preview.
pub const NO_CONTENT_PLACEHOLDER: &str = "No view endpoint found.";

/// A document in the user's library, as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocItem {
    /// Server-assigned document ID.
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// Upload date as reported by the server.
    pub upload_date: String,
    /// Short text preview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// File size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

impl DocItem {
    /// Create a document item.
    pub fn new(
        id: impl Into<String>,
        filename: impl Into<String>,
        upload_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            upload_date: upload_date.into(),
            preview: None,
            file_size: None,
        }
    }

    /// Set the preview text.
    #[must_use]
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    /// Set the file size.
    #[must_use]
    pub fn with_file_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }
}

/// The viewable text of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContent {
    /// Document ID.
    pub id: String,
    /// Filename to show as the title.
    pub filename: String,
    /// Full text, or the best available fallback.
    pub content: String,
}

impl DocumentContent {
    /// Build the fallback view from a list item's preview.
    #[must_use]
    pub fn from_preview(doc: &DocItem) -> Self {
        Self {
            id: doc.id.clone(),
            filename: doc.filename.clone(),
            content: doc
                .preview
                .clone()
                .unwrap_or_else(|| NO_CONTENT_PLACEHOLDER.to_string()),
        }
    }
}
