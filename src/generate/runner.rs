//! Generation run: plan (essay, template) pairs, call the client, record results.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, info, warn};

use super::records::{EssayRecord, VariantRecord, VariantWriter, read_essays};
use super::{GenerateError, Result};
use crate::llm::{ChatRequest, ChatResponse, LlmClient, LlmError};
use crate::prompt::{ChatMessage, PromptStore, PromptTemplate, render_chat};

/// Placeholder filled with each essay's text
pub const ESSAY_PLACEHOLDER: &str = "essay_text";

/// Intent label to prompt id, used with `intent_only`
pub fn default_intents() -> IndexMap<String, String> {
    [
        ("grammar", "v1.ai_refined_grammar"),
        ("vocabulary", "v1.ai_refined_vocabulary"),
        ("cohesion", "v1.ai_refined_cohesion"),
        ("syntax", "v1.ai_refined_syntax"),
        ("full_rewrite", "v1.ai_full_rewrite"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Settings for one generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub model: String,
    /// Explicit prompt ids; empty means every loaded template
    pub prompt_ids: Vec<String>,
    pub intent_only: bool,
    pub intents: IndexMap<String, String>,
    pub dry_run: bool,
    /// Pause between consecutive calls
    pub sleep: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl GenerateOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            model: model.into(),
            prompt_ids: Vec::new(),
            intent_only: false,
            intents: default_intents(),
            dry_run: false,
            sleep: Duration::ZERO,
            max_retries: 0,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

/// What a dry run would have sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunEntry {
    pub prompt_id: String,
    pub text_id: String,
    pub messages: [ChatMessage; 2],
}

#[derive(Debug, Clone, Default)]
pub struct GenerateSummary {
    pub ok: usize,
    pub failed: usize,
    pub previews: Vec<DryRunEntry>,
}

/// Runs prompts from a store against an LLM client
pub struct Generator<'a> {
    store: &'a PromptStore,
    client: &'a dyn LlmClient,
    options: GenerateOptions,
}

impl<'a> Generator<'a> {
    pub fn new(store: &'a PromptStore, client: &'a dyn LlmClient, options: GenerateOptions) -> Self {
        Self { store, client, options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Read the input file and run every planned call
    ///
    /// An existing output file is refused up front, dry run or not.
    pub async fn run(&self) -> Result<GenerateSummary> {
        if self.options.output.exists() {
            return Err(GenerateError::OutputExists(self.options.output.clone()));
        }
        let essays = read_essays(&self.options.input)?;
        info!("Read {} essays from {}", essays.len(), self.options.input.display());
        self.run_essays(&essays).await
    }

    /// Run every planned call for already-loaded essays
    pub async fn run_essays(&self, essays: &[EssayRecord]) -> Result<GenerateSummary> {
        let plan = self.plan(essays)?;
        info!("Planned {} generation calls", plan.len());

        let mut summary = GenerateSummary::default();
        let mut writer = if self.options.dry_run {
            None
        } else {
            Some(VariantWriter::create(&self.options.output)?)
        };

        for (index, (essay, template)) in plan.iter().enumerate() {
            let values = HashMap::from([(ESSAY_PLACEHOLDER, essay.full_text.as_str())]);
            let messages = render_chat(template, &values)?;

            let Some(writer) = writer.as_mut() else {
                summary.previews.push(DryRunEntry {
                    prompt_id: template.id().to_string(),
                    text_id: essay.text_id.clone(),
                    messages,
                });
                continue;
            };

            let record = VariantRecord::new(essay, template, &self.options.model);
            let request = ChatRequest::new(self.options.model.clone(), messages);
            let record = match self.complete_with_retry(request).await {
                Ok(response) => {
                    summary.ok += 1;
                    record.succeeded(response.content.unwrap_or_default())
                }
                Err(e) => {
                    warn!("{} / {} failed: {}", template.id(), essay.text_id, e);
                    summary.failed += 1;
                    record.failed(e)
                }
            };
            writer.append(&record)?;

            if !self.options.sleep.is_zero() && index + 1 < plan.len() {
                tokio::time::sleep(self.options.sleep).await;
            }
        }

        info!("Generation finished: {} ok, {} failed", summary.ok, summary.failed);
        Ok(summary)
    }

    /// Resolve every (essay, template) pair before any call is made
    fn plan<'e>(&self, essays: &'e [EssayRecord]) -> Result<Vec<(&'e EssayRecord, &'a PromptTemplate)>> {
        let mut plan = Vec::new();
        if self.options.intent_only {
            for essay in essays {
                let intent = essay.intent();
                let id = self
                    .options
                    .intents
                    .get(intent)
                    .ok_or_else(|| GenerateError::UnknownIntent {
                        intent: intent.to_string(),
                        text_id: essay.text_id.clone(),
                    })?;
                plan.push((essay, self.store.get(id)?));
            }
            return Ok(plan);
        }

        let templates: Vec<&'a PromptTemplate> = if self.options.prompt_ids.is_empty() {
            self.store.list_all()
        } else {
            self.options
                .prompt_ids
                .iter()
                .map(|id| self.store.get(id))
                .collect::<std::result::Result<_, _>>()?
        };
        for essay in essays {
            for template in &templates {
                plan.push((essay, *template));
            }
        }
        Ok(plan)
    }

    async fn complete_with_retry(&self, request: ChatRequest) -> std::result::Result<ChatResponse, LlmError> {
        let mut attempt: u32 = 0;
        loop {
            debug!("Requesting completion (attempt {})", attempt + 1);
            match self.client.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.options.max_retries => {
                    attempt += 1;
                    let wait = e.retry_after().unwrap_or(self.options.retry_backoff * attempt);
                    warn!("Retryable error ({}), retry {} in {:?}", e, attempt, wait);
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
