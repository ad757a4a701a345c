//! RAGFlow implementation of the session backend.
//!
//! Talks to the RAGFlow HTTP API (`/api/v1/chats/...`). Every response is
//! wrapped in a `{code, message, data}` envelope; a non-zero `code` means the
//! request was rejected even when the HTTP status is 200.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::backend::{AnswerPayload, BackendError, BackendResult, SessionBackend};

/// RAGFlow chat-assistant client.
pub struct RagflowBackend {
    client: reqwest::Client,
    base_url: String,
    assistant: String,
    /// Assistant id resolved from the configured name on first use.
    assistant_id: RwLock<Option<String>>,
}

impl RagflowBackend {
    /// Create a client for the RAGFlow server at `base_url`.
    ///
    /// The API key, when present, is sent as a `Bearer` token on every
    /// request. `assistant` is the display name of the chat assistant to
    /// converse with; its id is looked up lazily.
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        assistant: String,
        timeout_secs: u64,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}"))
                    .unwrap_or_else(|_| HeaderValue::from_static("")),
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            assistant,
            assistant_id: RwLock::new(None),
        }
    }

    /// Resolve the configured assistant name to its backend id, memoizing
    /// the result for the lifetime of this client.
    async fn assistant_id(&self) -> BackendResult<String> {
        if let Some(id) = self.assistant_id.read().await.clone() {
            return Ok(id);
        }

        let id = self.lookup_assistant().await?;
        *self.assistant_id.write().await = Some(id.clone());
        Ok(id)
    }

    async fn lookup_assistant(&self) -> BackendResult<String> {
        let url = format!("{}/v1/chats", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("page", "1"),
                ("page_size", "10"),
                ("name", self.assistant.as_str()),
            ])
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        // The `name` query is a server-side filter, not an exact match, so
        // re-check equality on the returned page.
        let listing: Vec<ChatAssistant> = parse_data(response).await?;
        let found = listing.into_iter().find(|chat| chat.name == self.assistant);

        match found {
            Some(chat) => {
                tracing::debug!(
                    assistant = %self.assistant,
                    assistant_id = %chat.id,
                    "Resolved chat assistant"
                );
                Ok(chat.id)
            }
            None => Err(BackendError::AssistantNotFound(self.assistant.clone())),
        }
    }
}

#[async_trait]
impl SessionBackend for RagflowBackend {
    async fn create_session(&self, name_hint: &str) -> BackendResult<String> {
        let assistant_id = self.assistant_id().await?;
        let url = format!("{}/v1/chats/{}/sessions", self.base_url, assistant_id);

        let response = self
            .client
            .post(&url)
            .json(&SessionRequest {
                name: name_hint.to_string(),
            })
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        let created: CreatedSession = parse_data(response).await?;
        tracing::info!(session_id = %created.id, "Created backend session");
        Ok(created.id)
    }

    async fn ask(&self, session_id: &str, question: &str) -> BackendResult<AnswerPayload> {
        let assistant_id = self.assistant_id().await?;
        let url = format!("{}/v1/chats/{}/completions", self.base_url, assistant_id);

        let response = self
            .client
            .post(&url)
            .json(&CompletionRequest {
                question: question.to_string(),
                stream: false,
                session_id: session_id.to_string(),
            })
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        parse_data(response).await
    }

    async fn delete_session(&self, session_id: &str) -> BackendResult<()> {
        let assistant_id = self.assistant_id().await?;
        let url = format!("{}/v1/chats/{}/sessions", self.base_url, assistant_id);

        let response = self
            .client
            .delete(&url)
            .json(&DeleteSessionsRequest {
                ids: vec![session_id.to_string()],
            })
            .send()
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;

        verify_ok(response).await
    }
}

/// Unwrap the `{code, message, data}` envelope and extract its `data` field.
async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> BackendResult<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ApiEnvelope<T> = response.json().await.map_err(|e| BackendError::Rejected {
        status: status.as_u16(),
        message: format!("Failed to parse response: {e}"),
    })?;

    if envelope.code != 0 {
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| format!("Backend error code {}", envelope.code)),
        });
    }

    envelope.data.ok_or_else(|| BackendError::Rejected {
        status: status.as_u16(),
        message: "Response missing data".to_string(),
    })
}

/// Like [`parse_data`] but tolerates an absent `data` field. Deletions
/// answer with a bare `{code: 0}`.
async fn verify_ok(response: reqwest::Response) -> BackendResult<()> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let envelope: ApiEnvelope<serde_json::Value> =
        response.json().await.map_err(|e| BackendError::Rejected {
            status: status.as_u16(),
            message: format!("Failed to parse response: {e}"),
        })?;

    if envelope.code != 0 {
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| format!("Backend error code {}", envelope.code)),
        });
    }

    Ok(())
}

// ============================================================================
// RAGFlow API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    code: i64,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ChatAssistant {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedSession {
    id: String,
}

#[derive(Debug, Serialize)]
struct SessionRequest {
    name: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    question: String,
    stream: bool,
    session_id: String,
}

#[derive(Debug, Serialize)]
struct DeleteSessionsRequest {
    ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_backend(uri: String) -> RagflowBackend {
        RagflowBackend::new(uri, Some("test-key".to_string()), "Erni".to_string(), 5)
    }

    async fn mount_assistant_listing(server: &MockServer, expect: u64) {
        Mock::given(method("GET"))
            .and(path("/v1/chats"))
            .and(query_param("name", "Erni"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": [
                    {"id": "chat-1", "name": "Erni"},
                    {"id": "chat-2", "name": "Ernesto"}
                ]
            })))
            .expect(expect)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_create_session_resolves_assistant() {
        let server = MockServer::start().await;
        mount_assistant_listing(&server, 1).await;

        Mock::given(method("POST"))
            .and(path("/v1/chats/chat-1/sessions"))
            .and(body_json(json!({"name": "weaver-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"id": "sess-9"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = test_backend(server.uri());
        let session_id = backend.create_session("weaver-1").await.unwrap();
        assert_eq!(session_id, "sess-9");
    }

    #[tokio::test]
    async fn test_assistant_lookup_is_memoized() {
        let server = MockServer::start().await;
        mount_assistant_listing(&server, 1).await;

        Mock::given(method("POST"))
            .and(path("/v1/chats/chat-1/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"id": "sess-1"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let backend = test_backend(server.uri());
        backend.create_session("a").await.unwrap();
        backend.create_session("b").await.unwrap();
    }

    #[tokio::test]
    async fn test_assistant_missing_from_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/chats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": [{"id": "chat-3", "name": "Ernie"}]
            })))
            .mount(&server)
            .await;

        let backend = test_backend(server.uri());
        let error = backend.create_session("x").await.unwrap_err();
        assert!(matches!(error, BackendError::AssistantNotFound(name) if name == "Erni"));
    }

    #[tokio::test]
    async fn test_ask_returns_answer_with_references() {
        let server = MockServer::start().await;
        mount_assistant_listing(&server, 1).await;

        Mock::given(method("POST"))
            .and(path("/v1/chats/chat-1/completions"))
            .and(body_json(json!({
                "question": "what is the sla?",
                "stream": false,
                "session_id": "sess-9"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {
                    "answer": "99.9% uptime ##1$$",
                    "reference": {
                        "doc_aggs": [{"doc_id": "d1", "doc_name": "SLA.pdf"}],
                        "chunks": [{"document_name": "SLA.pdf", "content": "uptime"}]
                    }
                }
            })))
            .mount(&server)
            .await;

        let backend = test_backend(server.uri());
        let payload = backend.ask("sess-9", "what is the sla?").await.unwrap();
        assert_eq!(payload.answer, "99.9% uptime ##1$$");

        let reference = payload.reference.unwrap();
        assert_eq!(reference.doc_aggs.len(), 1);
        assert_eq!(reference.doc_aggs[0].doc_name, "SLA.pdf");
        assert_eq!(reference.chunks.len(), 1);
    }

    #[tokio::test]
    async fn test_nonzero_envelope_code_is_rejected() {
        let server = MockServer::start().await;
        mount_assistant_listing(&server, 1).await;

        Mock::given(method("POST"))
            .and(path("/v1/chats/chat-1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 102,
                "message": "Session does not exist"
            })))
            .mount(&server)
            .await;

        let backend = test_backend(server.uri());
        let error = backend.ask("gone", "hi").await.unwrap_err();
        match error {
            BackendError::Rejected { status, message } => {
                assert_eq!(status, 200);
                assert!(message.contains("Session does not exist"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_is_rejected_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/chats"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let backend = test_backend(server.uri());
        let error = backend.create_session("x").await.unwrap_err();
        assert!(matches!(error, BackendError::Rejected { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let backend = test_backend(uri);
        let error = backend.create_session("x").await.unwrap_err();
        assert!(matches!(error, BackendError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_delete_session_tolerates_bare_ok() {
        let server = MockServer::start().await;
        mount_assistant_listing(&server, 1).await;

        Mock::given(method("DELETE"))
            .and(path("/v1/chats/chat-1/sessions"))
            .and(body_json(json!({"ids": ["sess-9"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let backend = test_backend(server.uri());
        backend.delete_session("sess-9").await.unwrap();
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start().await;
        mount_assistant_listing(&server, 1).await;

        Mock::given(method("POST"))
            .and(path("/v1/chats/chat-1/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"id": "sess-2"}
            })))
            .mount(&server)
            .await;

        let backend = RagflowBackend::new(
            format!("{}/", server.uri()),
            Some("test-key".to_string()),
            "Erni".to_string(),
            5,
        );
        let session_id = backend.create_session("n").await.unwrap();
        assert_eq!(session_id, "sess-2");
    }
}
