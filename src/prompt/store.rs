//! Prompt Store - Load and validate prompt templates
//!
//! This module provides the PromptStore struct which builds an immutable,
//! insertion-ordered collection of templates from definition records.

use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::template::{PromptTemplate, TemplateRecord};
use crate::error::{PromptError, Result};

/// Template definitions shipped with the crate
const BUILTIN_PROMPTS: &str = include_str!("../../prompts/ai_influence_v1.yaml");

/// Read-only collection of validated prompt templates keyed by id
#[derive(Debug, Clone, Default)]
pub struct PromptStore {
    templates: IndexMap<String, PromptTemplate>,
}

impl PromptStore {
    /// Build a store from definition records
    ///
    /// Every record is validated; the first invalid record aborts the whole
    /// load. A repeated id replaces the earlier template but keeps its slot.
    pub fn load<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = TemplateRecord>,
    {
        let mut templates = IndexMap::new();
        for record in records {
            let template = PromptTemplate::try_from(record)?;
            debug!("Loaded prompt '{}' v{}", template.id(), template.prompt_version());
            if let Some(previous) = templates.insert(template.id().to_string(), template) {
                warn!("Duplicate prompt id '{}', later definition wins", previous.id());
            }
        }
        info!("Loaded {} prompt templates", templates.len());
        Ok(Self { templates })
    }

    /// Parse a YAML sequence of records and load it
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Self::load(Vec::new());
        }
        let records: Option<Vec<TemplateRecord>> = serde_yaml::from_str(content)?;
        Self::load(records.unwrap_or_default())
    }

    /// Read a YAML definition file and load it
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PromptError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read prompt definitions from {:?}: {}", path, e),
            ))
        })?;
        info!("Loading prompt definitions from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// The definitions embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_PROMPTS)
    }

    /// All templates in load order
    pub fn list_all(&self) -> Vec<&PromptTemplate> {
        self.templates.values().collect()
    }

    /// Look up a template by its full id (e.g. `v1.ai_refined_grammar`)
    pub fn get(&self, id: &str) -> Result<&PromptTemplate> {
        self.templates
            .get(id)
            .ok_or_else(|| PromptError::NotFound(id.to_string()))
    }

    /// Template ids in load order
    pub fn ids(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
