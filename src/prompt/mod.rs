//! Prompt System - Template loading and rendering
//!
//! This module provides functionality for loading versioned prompt templates
//! from YAML definitions and rendering them into chat messages or a single
//! text prompt.

mod render;
mod store;
mod template;

pub use render::{ChatMessage, Rendered, Role, render, render_chat, render_text, render_user};
pub use store::PromptStore;
pub use template::{PromptTemplate, TemplateRecord, scan_placeholders};
