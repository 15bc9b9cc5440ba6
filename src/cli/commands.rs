//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - list: list loaded prompt templates
//! - preview: show rendered prompts without calling an API
//! - generate: run prompts over essays and record the outputs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// variantgen - render essay prompts and generate AI-influenced variants
#[derive(Parser, Debug)]
#[command(name = "variantgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Prompt definition file (defaults to the built-in prompts)
    #[arg(short, long, global = true)]
    pub prompts: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all loaded prompt templates
    List,

    /// Print the messages and text prompt each template would produce
    Preview {
        /// Prompt ID to preview (repeatable, defaults to all prompts)
        #[arg(short, long = "id")]
        ids: Vec<String>,

        /// Essay text to render into the prompts
        #[arg(short, long)]
        essay: Option<String>,
    },

    /// Generate variants for every essay in a CSV or JSONL file
    Generate {
        /// Input file of essays with text_id, full_text, intent; `.csv` is CSV, anything else JSONL
        /// (see data/demo_essays.csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file, CSV or JSONL by extension; must not exist yet
        #[arg(short, long)]
        output: PathBuf,

        /// Model name (overrides config)
        #[arg(short, long)]
        model: Option<String>,

        /// Prompt ID to run (repeatable, defaults to all prompts)
        #[arg(long = "prompt-id")]
        prompt_ids: Vec<String>,

        /// Sleep between API calls, in seconds (overrides config)
        #[arg(long)]
        sleep: Option<f64>,

        /// Use each essay's intent to select exactly one prompt
        #[arg(long)]
        intent_only: bool,

        /// Print prompts only; do not call the API
        #[arg(long)]
        dry_run: bool,

        /// Retries for rate limits and server errors (overrides config)
        #[arg(long)]
        max_retries: Option<u32>,
    },
}
