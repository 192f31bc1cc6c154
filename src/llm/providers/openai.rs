use crate::config::LlmConfig;
use crate::llm::{LlmError, SqlGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

// Low temperature keeps generated SQL close to deterministic.
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: usize = 500;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize, Debug)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LlmError::ConfigError("OPENAI_API_KEY environment variable not set".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl SqlGenerator for OpenAiProvider {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!("Sending chat completion request to {}", self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = match response.text().await {
                Ok(body) if !body.is_empty() => format!(" - Response body: {}", body),
                _ => String::new(),
            };

            error!("Completion API responded with status code: {}{}", status, error_body);
            return Err(LlmError::ResponseError(format!(
                "API responded with status code: {}{}",
                status, error_body
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseError(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::ResponseError("No choices in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_stub(status: StatusCode, reply: Value) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            let auth = headers
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string);
                            captured.lock().unwrap().push((auth, body));
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v1/chat/completions", addr), captured)
    }

    fn config(api_url: String) -> LlmConfig {
        LlmConfig {
            api_key: Some("sk-test".to_string()),
            api_url,
            ..LlmConfig::default()
        }
    }

    #[tokio::test]
    async fn sends_system_and_user_messages() {
        let (url, captured) = spawn_stub(
            StatusCode::OK,
            json!({"choices": [{"message": {"role": "assistant", "content": "SELECT 1"}}]}),
        )
        .await;
        let provider = OpenAiProvider::new(&config(url)).unwrap();

        let content = provider.complete("system text", "Question: q").await.unwrap();
        assert_eq!(content, "SELECT 1");

        let captured = captured.lock().unwrap();
        let (auth, body) = &captured[0];
        assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "system text");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Question: q");
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[tokio::test]
    async fn error_status_becomes_response_error() {
        let (url, _) = spawn_stub(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "Incorrect API key provided"}}),
        )
        .await;
        let provider = OpenAiProvider::new(&config(url)).unwrap();

        let err = provider.complete("s", "u").await.unwrap_err();
        match err {
            LlmError::ResponseError(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("Incorrect API key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let (url, _) = spawn_stub(StatusCode::OK, json!({"choices": []})).await;
        let provider = OpenAiProvider::new(&config(url)).unwrap();
        assert!(matches!(
            provider.complete("s", "u").await,
            Err(LlmError::ResponseError(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_error() {
        // Nothing listens on the discard port on loopback.
        let provider =
            OpenAiProvider::new(&config("http://127.0.0.1:9/v1/chat/completions".to_string()))
                .unwrap();
        assert!(matches!(
            provider.complete("s", "u").await,
            Err(LlmError::ConnectionError(_))
        ));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let config = LlmConfig {
            api_key: Some("  ".to_string()),
            ..LlmConfig::default()
        };
        assert!(matches!(
            OpenAiProvider::new(&config),
            Err(LlmError::ConfigError(_))
        ));
    }
}
