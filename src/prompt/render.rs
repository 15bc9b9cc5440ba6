//! Prompt Renderer - Substitute placeholder values into loaded templates
//!
//! Rendering is a pure function of (template, values). Two output shapes are
//! produced: a two-message chat list and a single flattened text prompt.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::template::{PromptTemplate, placeholder_regex};
use crate::error::{PromptError, Result};

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in chat-completion format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Both render shapes for one (template, values) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub messages: [ChatMessage; 2],
    pub text: String,
}

fn check_values<K, V>(template: &PromptTemplate, values: &HashMap<K, V>) -> Result<()>
where
    K: Borrow<str> + Hash + Eq,
{
    let mut missing: Vec<String> = Vec::new();
    for name in template.placeholders() {
        if !values.contains_key(name.as_str()) && !missing.contains(name) {
            missing.push(name.clone());
        }
    }
    if !missing.is_empty() {
        return Err(PromptError::MissingPlaceholder {
            id: template.id().to_string(),
            missing,
        });
    }
    Ok(())
}

/// Render the user instruction with every `{name}` replaced by its value
///
/// All declared placeholders must be present in `values`; extra keys are
/// ignored. Substituted values are not scanned again.
pub fn render_user<K, V>(template: &PromptTemplate, values: &HashMap<K, V>) -> Result<String>
where
    K: Borrow<str> + Hash + Eq,
    V: Display,
{
    check_values(template, values)?;

    let user = template.user();
    let mut rendered = String::with_capacity(user.len());
    let mut last = 0;
    for caps in placeholder_regex().captures_iter(user) {
        let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let name = name.as_str();
        let value = values
            .get(name)
            .filter(|_| template.declares(name))
            .ok_or_else(|| PromptError::UnresolvedPlaceholder {
                id: template.id().to_string(),
                name: name.to_string(),
            })?;
        rendered.push_str(&user[last..token.start()]);
        rendered.push_str(&value.to_string());
        last = token.end();
    }
    rendered.push_str(&user[last..]);

    Ok(rendered.trim().to_string())
}

/// Render a single prompt string: system, user and output format separated
/// by blank lines, empty parts dropped
pub fn render_text<K, V>(template: &PromptTemplate, values: &HashMap<K, V>) -> Result<String>
where
    K: Borrow<str> + Hash + Eq,
    V: Display,
{
    let user = render_user(template, values)?;
    let parts = [template.system().trim(), user.as_str(), template.output_format().trim()];
    Ok(parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Render the fixed two-message chat: system, then user with the output
/// format appended
pub fn render_chat<K, V>(template: &PromptTemplate, values: &HashMap<K, V>) -> Result<[ChatMessage; 2]>
where
    K: Borrow<str> + Hash + Eq,
    V: Display,
{
    let user = render_user(template, values)?;
    let user_with_format = format!("{}\n\n{}", user, template.output_format().trim());
    Ok([
        ChatMessage::system(template.system().trim()),
        ChatMessage::user(user_with_format.trim()),
    ])
}

/// Render both shapes at once
pub fn render<K, V>(template: &PromptTemplate, values: &HashMap<K, V>) -> Result<Rendered>
where
    K: Borrow<str> + Hash + Eq,
    V: Display,
{
    Ok(Rendered {
        messages: render_chat(template, values)?,
        text: render_text(template, values)?,
    })
}
