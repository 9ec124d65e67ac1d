//! Text-generation client for OpenAI-compatible chat-completions APIs
//! (Ollama, vLLM, OpenAI itself).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use shopkeep_core::error::DomainError;
use shopkeep_core::generation::{GenerationRequest, TextGenerator};

/// Default base URL (a local Ollama).
pub const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434";

/// Default model name.
pub const DEFAULT_LLM_MODEL: &str = "llama3.1";

/// Default request timeout.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl OpenAiCompatibleClient {
    /// Creates a client. Requests time out after `timeout`.
    #[must_use]
    pub fn new(base_url: &str, model: &str, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
            api_key,
        }
    }
}

impl Default for OpenAiCompatibleClient {
    fn default() -> Self {
        Self::new(DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, None, DEFAULT_LLM_TIMEOUT)
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, DomainError> {
        let api_request = build_request(&self.model, request);

        let mut builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&api_request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DomainError::UpstreamUnavailable(format!("text generation: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DomainError::UpstreamUnavailable(format!(
                "text generation returned {status}: {error_text}"
            )));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::MalformedUpstreamOutput(e.to_string()))?;

        let content = convert_response(api_response)?;
        debug!(model = %self.model, chars = content.len(), "text generated");
        Ok(content)
    }
}

fn build_request(model: &str, request: GenerationRequest) -> ChatRequest {
    ChatRequest {
        model: model.to_owned(),
        messages: vec![
            ChatMessage {
                role: "system".to_owned(),
                content: Some(request.system_prompt),
            },
            ChatMessage {
                role: "user".to_owned(),
                content: Some(request.user_prompt),
            },
        ],
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

fn convert_response(response: ChatResponse) -> Result<String, DomainError> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        DomainError::MalformedUpstreamOutput("no choices in text-generation response".to_owned())
    })?;

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(DomainError::MalformedUpstreamOutput(
            "empty text-generation response".to_owned(),
        )),
    }
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize, Default)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_build_request_sends_system_then_user() {
        let request = GenerationRequest::new("contract", "question").with_max_tokens(50);

        let body = serde_json::to_value(build_request("llama3.1", request)).unwrap();

        assert_eq!(body["model"], "llama3.1");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "question");
        assert_eq!(body["max_tokens"], 50);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_convert_response_rejects_empty_choices() {
        let response: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();

        assert!(matches!(
            convert_response(response),
            Err(DomainError::MalformedUpstreamOutput(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_returns_first_choice_content() {
        // Arrange
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][0]["content"], "contract");
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "Score: 80" } }]
                }))
            }),
        );
        let base_url = serve(router).await;
        let client =
            OpenAiCompatibleClient::new(&base_url, "test-model", None, Duration::from_secs(5));

        // Act
        let reply = client
            .generate(GenerationRequest::new("contract", "question"))
            .await
            .unwrap();

        // Assert
        assert_eq!(reply, "Score: 80");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_unavailable() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        );
        let base_url = serve(router).await;
        let client =
            OpenAiCompatibleClient::new(&base_url, "test-model", None, Duration::from_secs(5));

        let result = client.generate(GenerationRequest::new("a", "b")).await;

        assert!(matches!(result, Err(DomainError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upstream_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = OpenAiCompatibleClient::new(
            &format!("http://{addr}"),
            "test-model",
            None,
            Duration::from_secs(2),
        );

        let result = client.generate(GenerationRequest::new("a", "b")).await;

        assert!(matches!(result, Err(DomainError::UpstreamUnavailable(_))));
    }
}
