//! LLM Client Layer - chat-completion API integration
//!
//! This module provides:
//! - LlmClient trait for API abstraction
//! - OpenAiClient implementation
//! - MockLlmClient for tests

pub mod client;
pub mod openai;

pub use client::{ChatRequest, ChatResponse, LlmClient, LlmError, MockLlmClient, TokenUsage};
pub use openai::{OpenAiClient, OpenAiConfig};
