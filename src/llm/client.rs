//! Core LLM client types and trait definitions

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::prompt::ChatMessage;

/// Stateless chat-completion client; each call is independent
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Model used when a request does not name one
    fn model(&self) -> &str;
}

/// A chat-completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: impl Into<Vec<ChatMessage>>) -> Self {
        Self {
            model: model.into(),
            messages: messages.into(),
        }
    }
}

/// Response from a completion request
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Text of the first choice, if the model produced any
    pub content: Option<String>,

    /// Token usage for cost tracking
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },
}

impl LlmError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_) => false,
            LlmError::JsonError(_) => false,
            LlmError::MissingApiKey { .. } => false,
        }
    }

    /// Server-requested wait before the next attempt, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Scripted client for tests and dry runs
///
/// Replies are consumed in order; once the script is exhausted every call
/// returns the default reply.
pub struct MockLlmClient {
    model: String,
    default_reply: String,
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            default_reply: "mock reply".to_string(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    /// Queue a successful reply
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(reply.into()));
    }

    /// Queue a failure
    pub fn push_error(&self, error: LlmError) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let next = self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        let content = match next {
            Some(reply) => reply?,
            None => self.default_reply.clone(),
        };
        Ok(ChatResponse {
            content: Some(content),
            usage: TokenUsage::default(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest::new("m", vec![ChatMessage::system("s"), ChatMessage::user("u")])
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LlmError::RateLimited { retry_after: None }.is_retryable());
        assert!(LlmError::ApiError { status: 503, message: "down".into() }.is_retryable());
        assert!(!LlmError::ApiError { status: 400, message: "bad".into() }.is_retryable());
        assert!(!LlmError::InvalidResponse("no choices".into()).is_retryable());
        assert!(!LlmError::MissingApiKey { env_var: "X".into() }.is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = LlmError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };
        assert!(err.is_rate_limit());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(LlmError::InvalidResponse("x".into()).retry_after(), None);
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            prompt_tokens: 120,
            completion_tokens: 30,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn test_request_serializes_messages() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[tokio::test]
    async fn test_mock_script_then_default() {
        let mock = MockLlmClient::new().with_default_reply("fallback");
        mock.push_reply("first");
        mock.push_error(LlmError::ApiError {
            status: 500,
            message: "boom".into(),
        });

        let first = mock.complete(request()).await.unwrap();
        assert_eq!(first.content.as_deref(), Some("first"));

        let second = mock.complete(request()).await;
        assert!(matches!(second, Err(LlmError::ApiError { status: 500, .. })));

        let third = mock.complete(request()).await.unwrap();
        assert_eq!(third.content.as_deref(), Some("fallback"));

        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.requests()[0], request());
        assert_eq!(mock.model(), "mock-model");
    }
}
