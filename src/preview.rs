//! Preview what would be sent to an LLM for a template, without calling one.

use std::collections::HashMap;
use std::fmt::Write;

use crate::error::Result;
use crate::generate::ESSAY_PLACEHOLDER;
use crate::prompt::{PromptTemplate, render};

/// Short essay used when the caller does not supply one
pub const SAMPLE_ESSAY: &str = "I think using phones in class can be helpful, because students can search \
information fast, but sometimes it makes them distracted and they do not listen the teacher.";

const RULE_WIDTH: usize = 80;

fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the chat messages and single-string prompt for `template`
pub fn format_preview(template: &PromptTemplate, essay: &str) -> Result<String> {
    let values = HashMap::from([(ESSAY_PLACEHOLDER, essay)]);
    let rendered = render(template, &values)?;

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Prompt ID : {}", template.id());
    let _ = writeln!(out, "Version   : {}", template.prompt_version());
    let _ = writeln!(out, "Task type : {}", template.task_type());
    let _ = writeln!(out, "Aspects   : {}", template.aspects().join(", "));
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));

    let _ = writeln!(out, "Chat-style messages:\n");
    for message in &rendered.messages {
        let _ = writeln!(out, "[{}]", message.role);
        let _ = writeln!(out, "{}\n", indent(&message.content, "  "));
    }

    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
    let _ = writeln!(out, "Single-string prompt:\n");
    let _ = writeln!(out, "{}", indent(&rendered.text, "  "));
    Ok(out)
}
