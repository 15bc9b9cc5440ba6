//! Variant generation - render prompts for each essay and record LLM output
//!
//! The generator reads essays, picks templates (explicitly, all of them, or
//! one per essay by intent), sends the rendered chat to an `LlmClient` and
//! appends one `VariantRecord` per call to a CSV or JSONL file.

mod records;
mod runner;

use std::path::PathBuf;

use thiserror::Error;

use crate::error::PromptError;

pub use records::{EssayRecord, RecordFormat, VariantRecord, VariantStatus, VariantWriter, read_essays};
pub use runner::{DryRunEntry, ESSAY_PLACEHOLDER, GenerateOptions, GenerateSummary, Generator, default_intents};

/// Errors that abort a generation run
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Output file exists: {0}")]
    OutputExists(PathBuf),

    #[error("Unknown or missing intent '{intent}' for text_id='{text_id}'")]
    UnknownIntent { intent: String, text_id: String },

    #[error("Invalid essay record at {path:?} line {line}: {source}")]
    InvalidEssay {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, GenerateError>;
