//! Error types for variantgen
//!
//! Centralized error handling for the prompt core using thiserror.

use thiserror::Error;

/// All error types that can occur while loading or rendering prompt templates
#[derive(Debug, Error)]
pub enum PromptError {
    /// Declared placeholders do not match the tokens used in the template text
    #[error("Placeholder mismatch for prompt '{id}': declared={declared:?} found={found:?}")]
    Schema {
        id: String,
        declared: Vec<String>,
        found: Vec<String>,
    },

    /// No template with this id was loaded
    #[error("Prompt not found: {0}")]
    NotFound(String),

    /// Render called without values for declared placeholders
    #[error("Missing values for placeholders {missing:?} when using prompt '{id}'")]
    MissingPlaceholder { id: String, missing: Vec<String> },

    /// A token survived validation but has no declared value
    #[error("Unfilled placeholder '{name}' in prompt '{id}'")]
    UnresolvedPlaceholder { id: String, name: String },

    /// Definition source is not valid YAML or lacks a required field
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error() {
        let err = PromptError::Schema {
            id: "v1.ai_full_rewrite".to_string(),
            declared: vec!["essay_text".to_string()],
            found: vec![],
        };
        assert_eq!(
            err.to_string(),
            "Placeholder mismatch for prompt 'v1.ai_full_rewrite': declared=[\"essay_text\"] found=[]"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = PromptError::NotFound("v9.nope".to_string());
        assert_eq!(err.to_string(), "Prompt not found: v9.nope");
    }

    #[test]
    fn test_missing_placeholder_error() {
        let err = PromptError::MissingPlaceholder {
            id: "v1.ai_refined_grammar".to_string(),
            missing: vec!["essay_text".to_string(), "tone".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("essay_text"));
        assert!(msg.contains("tone"));
        assert!(msg.contains("v1.ai_refined_grammar"));
    }

    #[test]
    fn test_unresolved_placeholder_error() {
        let err = PromptError::UnresolvedPlaceholder {
            id: "x".to_string(),
            name: "topic".to_string(),
        };
        assert_eq!(err.to_string(), "Unfilled placeholder 'topic' in prompt 'x'");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PromptError = io_err.into();
        assert!(matches!(err, PromptError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{not: [a list").unwrap_err();
        let err: PromptError = yaml_err.into();
        assert!(matches!(err, PromptError::Parse(_)));
    }
}
