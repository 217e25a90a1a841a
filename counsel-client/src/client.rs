//! HTTP client for the counsel API.

use crate::config::ClientConfig;
use crate::error::{network_error, ClientError, ClientResult};
use crate::transport::{ByteStream, DocumentApi, StreamTransport};
use crate::types::*;
use async_trait::async_trait;
use counsel_core::{DocItem, DocumentContent};
use counsel_streaming::{consume_with_framer, LineFramer, StreamHandler, StreamOutcome};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, IntoUrl, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

/// Client for the legal-assistant backend.
#[derive(Debug, Clone)]
pub struct CounselClient {
    client: Client,
    config: ClientConfig,
}

impl CounselClient {
    /// Create a client from a configuration.
    ///
    /// The configured timeout bounds connecting and each idle gap between
    /// reads, not the whole response, so a long answer keeps streaming as
    /// long as frames keep arriving.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .read_timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ========================================================================
    // Health & status
    // ========================================================================

    /// `GET /health`.
    pub async fn health(&self) -> ClientResult<JsonValue> {
        self.get_json(self.config.url("/health")).await
    }

    /// `GET /`.
    pub async fn status(&self) -> ClientResult<JsonValue> {
        self.get_json(self.config.url("/")).await
    }

    // ========================================================================
    // Streaming endpoints
    // ========================================================================

    /// Stream a request's answer into `handler`.
    pub async fn stream<H: StreamHandler + Send>(
        &self,
        request: &StreamRequest,
        handler: H,
    ) -> ClientResult<StreamOutcome> {
        let body = self.open_stream(request).await?;
        let framer = LineFramer::with_max_line_bytes(self.config.max_line_bytes);
        Ok(consume_with_framer(body, framer, handler).await?)
    }

    /// Ask a question about specific documents.
    pub async fn ask_question<H: StreamHandler + Send>(
        &self,
        document_ids: Vec<String>,
        question: impl Into<String>,
        handler: H,
    ) -> ClientResult<StreamOutcome> {
        let request = StreamRequest::AskQuestion(AskQuestionRequest {
            document_ids,
            question: question.into(),
        });
        self.stream(&request, handler).await
    }

    /// Compare two or more documents.
    pub async fn compare_documents<H: StreamHandler + Send>(
        &self,
        document_ids: Vec<String>,
        criteria: Option<String>,
        handler: H,
    ) -> ClientResult<StreamOutcome> {
        let request = StreamRequest::CompareDocuments(CompareDocumentsRequest {
            document_ids,
            comparison_criteria: criteria,
        });
        self.stream(&request, handler).await
    }

    /// Ask a general legal question, using the configured jurisdiction and
    /// `top_k` unless overridden.
    pub async fn ask_law_question<H: StreamHandler + Send>(
        &self,
        question: impl Into<String>,
        jurisdiction: Option<String>,
        top_k: Option<u32>,
        handler: H,
    ) -> ClientResult<StreamOutcome> {
        let request = StreamRequest::AskLawQuestion(AskLawQuestionRequest {
            question: question.into(),
            jurisdiction: jurisdiction.unwrap_or_else(|| self.config.default_jurisdiction.clone()),
            top_k: top_k.unwrap_or(self.config.default_top_k),
        });
        self.stream(&request, handler).await
    }

    /// Review a contract.
    pub async fn review_contract<H: StreamHandler + Send>(
        &self,
        document_id: impl Into<String>,
        handler: H,
    ) -> ClientResult<StreamOutcome> {
        let request = StreamRequest::ReviewContract(ReviewContractRequest {
            document_id: document_id.into(),
        });
        self.stream(&request, handler).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn get_json<T: DeserializeOwned>(&self, url: impl IntoUrl) -> ClientResult<T> {
        let response = self.client.get(url).send().await?;
        parse_json(check_status(response).await?).await
    }
}

/// Fail with [`ClientError::Http`] on a non-success status.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "Request rejected");
    Err(ClientError::http(status.as_u16(), body))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    response
        .json()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl StreamTransport for CounselClient {
    async fn open_stream(&self, request: &StreamRequest) -> ClientResult<ByteStream> {
        let url = self.config.url(request.path());
        tracing::debug!(url = %url, "Opening answer stream");

        let response = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(&request.body()?)
            .send()
            .await?;
        let response = check_status(response).await?;

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| network_error(&e)));
        Ok(Box::pin(body))
    }
}

#[async_trait]
impl DocumentApi for CounselClient {
    async fn list_documents(&self) -> ClientResult<Vec<DocItem>> {
        let resp: DocumentsResponse = self.get_json(self.config.url("/api/documents")).await?;
        if !resp.success {
            tracing::debug!("Document list reported failure");
            return Err(ClientError::api("Failed to fetch documents"));
        }
        Ok(resp.documents)
    }

    async fn upload_document(&self, upload: DocumentUpload) -> ClientResult<String> {
        let mut part = Part::bytes(upload.bytes.to_vec()).file_name(upload.filename.clone());
        if let Some(mime) = &upload.mime_type {
            part = part.mime_str(mime)?;
        }
        let mut form = Form::new().part("file", part);
        if let Some(metadata) = upload.metadata {
            form = form.text("metadata", metadata);
        }

        tracing::debug!(filename = %upload.filename, "Uploading document");
        let response = self
            .client
            .post(self.config.url("/api/upload-document"))
            .multipart(form)
            .send()
            .await?;
        let resp: UploadResponse = parse_json(check_status(response).await?).await?;

        match (resp.success, resp.document_id.clone()) {
            (true, Some(id)) => Ok(id),
            (true, None) => Err(ClientError::InvalidResponse(
                "upload succeeded without a document_id".to_string(),
            )),
            (false, _) => Err(ClientError::api(resp.error_message())),
        }
    }

    async fn get_document(&self, id: &str) -> ClientResult<Option<DocumentContent>> {
        let resp: DocumentResponse = self.get_json(self.config.document_url(id)?).await?;
        Ok(resp.into_content(id))
    }

    async fn delete_document(&self, id: &str) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.config.document_url(id)?)
            .send()
            .await?;
        let resp: SuccessResponse = parse_json(check_status(response).await?).await?;
        if resp.success {
            Ok(())
        } else {
            Err(ClientError::api("Delete failed"))
        }
    }
}
