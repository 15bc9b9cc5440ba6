//! variantgen - versioned essay prompt templates and an LLM variant generator
//!
//! Prompt templates are loaded once from YAML into an immutable
//! [`prompt::PromptStore`] and rendered into chat messages or a single text
//! prompt. The [`generate`] module sends rendered prompts to an
//! [`llm::LlmClient`] and records the outputs.

pub mod error;
pub mod generate;
pub mod llm;
pub mod preview;
pub mod prompt;

pub use error::{PromptError, Result};
