//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, LanguageModel};
use crate::config::ModelConfig;
use crate::error::ModelError;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for any endpoint speaking the OpenAI `chat/completions` format.
///
/// The API key is handed in by the caller; the client never looks it up.
pub struct OpenAiChatModel {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f64,
    api_key: String,
}

impl OpenAiChatModel {
    /// Creates a client from the model configuration.
    ///
    /// # Errors
    ///
    /// - [`ModelError::MissingApiKey`] if `api_key` is blank
    /// - [`ModelError::Request`] if the HTTP client cannot be built
    pub fn new(config: &ModelConfig, api_key: impl Into<String>) -> Result<Self, ModelError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey(config.api_key_env.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.name.clone(),
            temperature: config.temperature,
            api_key,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(serde_json::json!({ "role": "system", "content": system }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": request.prompt }));

        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages,
        });

        debug!(
            "POST {} for {} ({} prompt chars)",
            self.endpoint,
            request.role,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModelError::EmptyCompletion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Stage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ModelConfig {
        ModelConfig {
            name: "test-model".to_string(),
            base_url: format!("{}/v1/", server.uri()),
            ..ModelConfig::default()
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(Stage::Position, "clinical", "Propose concepts")
            .with_system("You are a clinician.")
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let result = OpenAiChatModel::new(&ModelConfig::default(), "  ");
        assert!(matches!(result, Err(ModelError::MissingApiKey(env)) if env == "OPENAI_API_KEY"));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = ModelConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            ..ModelConfig::default()
        };
        let model = OpenAiChatModel::new(&config, "key").unwrap();
        assert_eq!(model.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(model.name(), "gpt-4.1-mini");
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "messages": [
                    { "role": "system", "content": "You are a clinician." },
                    { "role": "user", "content": "Propose concepts" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "- Smart cuff" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let model = OpenAiChatModel::new(&config_for(&server), "test-key").unwrap();
        let text = model.complete(&request()).await.unwrap();
        assert_eq!(text, "- Smart cuff");
    }

    #[tokio::test]
    async fn test_complete_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let model = OpenAiChatModel::new(&config_for(&server), "test-key").unwrap();
        let err = model.complete(&request()).await.unwrap_err();
        match &err {
            ModelError::Status { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected Status, got {:?}", other),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_complete_unauthorized_is_not_transient() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let model = OpenAiChatModel::new(&config_for(&server), "bad-key").unwrap();
        let err = model.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ModelError::Status { status: 401, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let model = OpenAiChatModel::new(&config_for(&server), "test-key").unwrap();
        let err = model.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ModelError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_complete_invalid_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let model = OpenAiChatModel::new(&config_for(&server), "test-key").unwrap();
        let err = model.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ModelError::Decode(_)));
    }
}
