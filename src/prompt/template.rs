//! Prompt Template - Immutable template values and placeholder scanning
//!
//! A `TemplateRecord` is one raw entry from the definition file. Turning it
//! into a `PromptTemplate` checks that the declared placeholders match the
//! `{name}` tokens actually used in the template text.

use std::collections::BTreeSet;
use std::num::NonZeroU32;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PromptError, Result};

/// `{identifier}` tokens; no escapes, no nesting
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid"));

/// Placeholder regex shared with the renderer
pub(crate) fn placeholder_regex() -> &'static Regex {
    &PLACEHOLDER_RE
}

/// Return every placeholder name used in `text`, in order of appearance
pub fn scan_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn default_version() -> NonZeroU32 {
    NonZeroU32::MIN
}

/// One raw template definition as it appears in the definition file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    /// Positive; `0` is rejected at parse time
    #[serde(default = "default_version")]
    pub prompt_version: NonZeroU32,
    #[serde(default)]
    pub task_type: String,
    pub variant: String,
    pub level: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub output_format: String,
    #[serde(default)]
    pub aspects: Vec<String>,
    #[serde(default)]
    pub placeholders: Vec<String>,
}

impl TemplateRecord {
    /// Create a record with the required fields and defaults for the rest
    pub fn new(id: impl Into<String>, variant: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt_version: default_version(),
            task_type: String::new(),
            variant: variant.into(),
            level: level.into(),
            description: String::new(),
            system: String::new(),
            user: String::new(),
            output_format: String::new(),
            aspects: Vec::new(),
            placeholders: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_output_format(mut self, output_format: impl Into<String>) -> Self {
        self.output_format = output_format.into();
        self
    }

    pub fn with_placeholders<I, S>(mut self, placeholders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.placeholders = placeholders.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_aspects<I, S>(mut self, aspects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aspects = aspects.into_iter().map(Into::into).collect();
        self
    }
}

/// A validated, read-only prompt template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    id: String,
    prompt_version: NonZeroU32,
    task_type: String,
    variant: String,
    level: String,
    description: String,
    system: String,
    user: String,
    output_format: String,
    aspects: Vec<String>,
    placeholders: Vec<String>,
}

impl TryFrom<TemplateRecord> for PromptTemplate {
    type Error = PromptError;

    fn try_from(record: TemplateRecord) -> Result<Self> {
        let template = Self {
            id: record.id,
            prompt_version: record.prompt_version,
            task_type: record.task_type,
            variant: record.variant,
            level: record.level,
            description: record.description,
            system: record.system,
            user: record.user,
            output_format: record.output_format,
            aspects: record.aspects,
            placeholders: record.placeholders,
        };
        template.validate_placeholders()?;
        Ok(template)
    }
}

impl PromptTemplate {
    /// Placeholder names used across system, user and output_format
    pub fn used_placeholders(&self) -> BTreeSet<String> {
        let text = format!("{}\n{}\n{}", self.system, self.user, self.output_format);
        scan_placeholders(&text).into_iter().collect()
    }

    /// Declared placeholder names as a set
    pub fn declared_placeholders(&self) -> BTreeSet<String> {
        self.placeholders.iter().cloned().collect()
    }

    fn validate_placeholders(&self) -> Result<()> {
        let declared = self.declared_placeholders();
        let found = self.used_placeholders();
        if declared != found {
            return Err(PromptError::Schema {
                id: self.id.clone(),
                declared: declared.into_iter().collect(),
                found: found.into_iter().collect(),
            });
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt_version(&self) -> u32 {
        self.prompt_version.get()
    }

    pub fn task_type(&self) -> &str {
        &self.task_type
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn output_format(&self) -> &str {
        &self.output_format
    }

    pub fn aspects(&self) -> &[String] {
        &self.aspects
    }

    /// Declared placeholder names, in declaration order
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Check whether `name` is a declared placeholder
    pub fn declares(&self, name: &str) -> bool {
        self.placeholders.iter().any(|p| p == name)
    }
}
