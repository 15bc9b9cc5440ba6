use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info, warn};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use variantgen::generate::{GenerateError, GenerateOptions, Generator};
use variantgen::llm::{LlmClient, MockLlmClient, OpenAiClient};
use variantgen::preview::{SAMPLE_ESSAY, format_preview};
use variantgen::prompt::PromptStore;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

/// Start logging before anything else runs; the level is narrowed once config is loaded
fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("variantgen")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("variantgen.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let env = env_logger::Env::default().default_filter_or("trace");
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();
    if !rust_log_set() {
        log::set_max_level(LevelFilter::Info);
    }

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn rust_log_set() -> bool {
    std::env::var_os("RUST_LOG").is_some()
}

/// Apply `log_level` from config unless RUST_LOG already decides
fn apply_log_level(config: &Config) {
    if rust_log_set() {
        return;
    }
    match config.log_filter() {
        Some(level) => log::set_max_level(level),
        None => {
            if let Some(level) = &config.log_level {
                warn!("Ignoring unknown log_level '{}'", level);
            }
        }
    }
}

fn load_store(cli: &Cli, config: &Config) -> Result<PromptStore> {
    match cli.prompts.as_ref().or(config.prompts_file.as_ref()) {
        Some(path) => PromptStore::from_path(path)
            .with_context(|| format!("Failed to load prompts from {}", path.display())),
        None => PromptStore::builtin().context("Failed to load built-in prompts"),
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<ExitCode> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let store = load_store(cli, config)?;

    match &cli.command {
        Commands::List => handle_list_command(&store),
        Commands::Preview { ids, essay } => handle_preview_command(&store, ids, essay.as_deref()),
        Commands::Generate {
            input,
            output,
            model,
            prompt_ids,
            sleep,
            intent_only,
            dry_run,
            max_retries,
        } => {
            let mut options = GenerateOptions::new(
                input,
                output,
                model.clone().unwrap_or_else(|| config.llm.model.clone()),
            );
            options.prompt_ids = prompt_ids.clone();
            options.intent_only = *intent_only;
            options.intents = config.generate.intents.clone();
            options.dry_run = *dry_run;
            options.sleep = match sleep {
                Some(secs) => Duration::try_from_secs_f64(*secs).context("Invalid --sleep value")?,
                None => Duration::from_millis(config.generate.sleep_ms),
            };
            options.max_retries = max_retries.unwrap_or(config.generate.max_retries);
            options.retry_backoff = Duration::from_millis(config.generate.retry_backoff_ms);
            handle_generate_command(&store, options, config).await
        }
    }
}

fn handle_list_command(store: &PromptStore) -> Result<ExitCode> {
    info!("Listing {} prompts", store.len());
    for template in store.list_all() {
        println!(
            "{} v{}  {} / {}  [{}]",
            template.id().green(),
            template.prompt_version(),
            template.variant(),
            template.level(),
            template.aspects().join(", ")
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_preview_command(store: &PromptStore, ids: &[String], essay: Option<&str>) -> Result<ExitCode> {
    let essay = essay.unwrap_or(SAMPLE_ESSAY);
    let templates = if ids.is_empty() {
        store.list_all()
    } else {
        ids.iter()
            .map(|id| store.get(id))
            .collect::<variantgen::Result<Vec<_>>>()
            .context("Unknown prompt id")?
    };
    for template in templates {
        let preview = format_preview(template, essay)
            .with_context(|| format!("Failed to render prompt {}", template.id()))?;
        println!("{}", preview);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_generate_command(store: &PromptStore, options: GenerateOptions, config: &Config) -> Result<ExitCode> {
    info!(
        "Generating from {} to {} with model {}",
        options.input.display(),
        options.output.display(),
        options.model
    );

    // Dry runs never reach the client, so they need no API key
    let client: Box<dyn LlmClient> = if options.dry_run {
        Box::new(MockLlmClient::new())
    } else {
        Box::new(OpenAiClient::new(config.llm.to_client_config()).context("Failed to create LLM client")?)
    };

    let generator = Generator::new(store, client.as_ref(), options);
    let summary = match generator.run().await {
        Ok(summary) => summary,
        Err(GenerateError::OutputExists(path)) => {
            eprintln!("{} output file exists: {}", "ERROR:".red(), path.display());
            eprintln!("Use a new output path or remove the existing file.");
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e).context("Generation failed"),
    };

    for entry in &summary.previews {
        println!("\n--- {} / {} ---", entry.prompt_id.cyan(), entry.text_id);
        for message in &entry.messages {
            println!("[{}] {}", message.role, message.content);
        }
    }

    if !generator.options().dry_run {
        println!(
            "{} {} ok, {} failed -> {}",
            "Done:".green(),
            summary.ok,
            summary.failed,
            generator.options().output.display()
        );
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    setup_logging().context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_log_level(&config);

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")
}
