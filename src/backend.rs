//! HTTP client for the RAG backend service.
//!
//! Three routes: `POST /query`, `POST /upload` (multipart) and the
//! startup-only `GET /health`. Requests run as tasks on the tokio
//! runtime; each task reports exactly one terminal [`AppEvent`] back to
//! the UI thread and wakes the egui event loop.

use crate::event::{AppEvent, BackendStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::mpsc;
use thiserror::Error;
use tokio::runtime::Handle;

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub context_sources: Vec<String>,
    pub audit_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub vector_id: String,
}

/// Error body convention shared by every backend route.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {detail}")]
    Backend { status: u16, detail: String },
}

impl BackendError {
    /// Text surfaced to the user: the backend's `detail` field verbatim
    /// when present, otherwise the transport layer's own message.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Transport(err) => err.to_string(),
            BackendError::Backend { detail, .. } => detail.clone(),
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    tx: mpsc::Sender<AppEvent>,
    runtime: Handle,
    egui_ctx: egui::Context,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        tx: mpsc::Sender<AppEvent>,
        runtime: Handle,
        egui_ctx: egui::Context,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            tx,
            runtime,
            egui_ctx,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// One-shot health probe, reported through the event channel.
    pub fn start(&self) {
        let client = self.clone();
        self.runtime.spawn(async move {
            let status = match client.health().await {
                Ok(()) => BackendStatus::Connected,
                Err(err) => {
                    tracing::warn!("health probe failed: {err}");
                    BackendStatus::Unreachable
                }
            };
            client.notify(AppEvent::BackendStatus(status));
        });
    }

    /// Fire a query task. The task settles with exactly one
    /// `QueryCompleted` or `QueryFailed` event, never both.
    pub fn dispatch_query(&self, request: QueryRequest) {
        tracing::debug!(model = %request.model, "dispatching query");
        let client = self.clone();
        self.runtime.spawn(async move {
            let event = match client.query(&request).await {
                Ok(response) => AppEvent::QueryCompleted {
                    answer: response.answer,
                    sources: response.context_sources,
                    audit_id: response.audit_id,
                },
                Err(err) => {
                    tracing::warn!("query failed: {err}");
                    AppEvent::QueryFailed(err.user_message())
                }
            };
            client.notify(event);
        });
    }

    /// Fire an upload task for a file on disk. Reads the bytes inside the
    /// task so a slow disk never stalls the UI thread.
    pub fn dispatch_upload(&self, file_name: String, path: PathBuf) {
        tracing::debug!(file = %file_name, "dispatching upload");
        let client = self.clone();
        self.runtime.spawn(async move {
            let event = match tokio::fs::read(&path).await {
                Err(err) => {
                    tracing::warn!(file = %file_name, "could not read {}: {err}", path.display());
                    AppEvent::UploadFailed(format!("could not read {}: {err}", path.display()))
                }
                Ok(bytes) => match client.upload_bytes(&file_name, bytes).await {
                    Ok(response) => AppEvent::UploadCompleted {
                        file_name,
                        vector_id: response.vector_id,
                    },
                    Err(err) => {
                        tracing::warn!(file = %file_name, "upload failed: {err}");
                        AppEvent::UploadFailed(err.user_message())
                    }
                },
            };
            client.notify(event);
        });
    }

    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, BackendError> {
        let response = self
            .http
            .post(self.endpoint("query"))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn upload_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, BackendError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<(), BackendError> {
        let response = self.http.get(self.endpoint("health")).send().await?;
        Self::error_for_status(response).await?;
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
        let response = Self::error_for_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Maps non-2xx responses to `BackendError::Backend`, preferring the
    /// body's `detail` field over a generic status message.
    async fn error_for_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => format!("request failed with status {status}"),
        };
        Err(BackendError::Backend {
            status: status.as_u16(),
            detail,
        })
    }

    fn notify(&self, event: AppEvent) {
        let _ = self.tx.send(event);
        self.egui_ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> BackendClient {
        let (tx, _rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime should build");
        BackendClient::new(base_url, tx, runtime.handle().clone(), egui::Context::default())
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = test_client("http://localhost:8080/");
        assert_eq!(client.endpoint("query"), "http://localhost:8080/query");
        assert_eq!(client.endpoint("/upload"), "http://localhost:8080/upload");
    }

    #[test]
    fn backend_error_prefers_detail_verbatim() {
        let err = BackendError::Backend {
            status: 500,
            detail: "model unavailable".to_string(),
        };
        assert_eq!(err.user_message(), "model unavailable");
        assert_eq!(err.to_string(), "HTTP 500: model unavailable");
    }

    #[test]
    fn query_response_tolerates_missing_sources() {
        let response: QueryResponse =
            serde_json::from_str(r#"{"answer":"hi","audit_id":"a1"}"#)
                .expect("payload should parse");
        assert!(response.context_sources.is_empty());
    }

    #[test]
    fn query_request_serializes_wire_fields() {
        let request = QueryRequest {
            query: "What is the capital of France?".to_string(),
            model: "llama3.2".to_string(),
        };
        let value = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(value["query"], "What is the capital of France?");
        assert_eq!(value["model"], "llama3.2");
    }
}
