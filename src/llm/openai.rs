//! OpenAI-compatible chat-completion client
//!
//! Works against any endpoint that speaks the `/chat/completions` protocol.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use super::client::{ChatRequest, ChatResponse, LlmClient, LlmError, TokenUsage};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model to use
pub const DEFAULT_MODEL: &str = "gpt-5-mini";

/// Environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the OpenAI client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl OpenAiConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// OpenAI chat-completion client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a client, reading the API key from `config.api_key_env`
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| LlmError::MissingApiKey {
            env_var: config.api_key_env.clone(),
        })?;
        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: impl Into<String>, config: OpenAiConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_body(&self, request: &ChatRequest) -> Value {
        let model = if request.model.is_empty() {
            &self.config.model
        } else {
            &request.model
        };
        json!({
            "model": model,
            "messages": request.messages,
        })
    }
}

/// Extract the first choice and usage from a chat-completion response body
fn parse_response(body: &Value) -> Result<ChatResponse, LlmError> {
    let message = body
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| LlmError::InvalidResponse("response has no choices[0].message".to_string()))?;

    let content = message.get("content").and_then(Value::as_str).map(str::to_string);

    let usage = body
        .get("usage")
        .map(|u| TokenUsage {
            prompt_tokens: u["prompt_tokens"].as_u64().unwrap_or(0),
            completion_tokens: u["completion_tokens"].as_u64().unwrap_or(0),
        })
        .unwrap_or_default();

    Ok(ChatResponse { content, usage })
}

/// Pull the human-readable message out of an error body, falling back to the raw text
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| text.to_string())
}

fn parse_retry_after(value: Option<&reqwest::header::HeaderValue>) -> Option<Duration> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = self.build_body(&request);
        debug!("POST {} model={}", self.endpoint(), body["model"]);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = parse_retry_after(response.headers().get(reqwest::header::RETRY_AFTER));
            return Err(LlmError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let body: Value = response.json().await?;
        parse_response(&body)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
