use eyre::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use variantgen::generate::default_intents;
use variantgen::llm::OpenAiConfig;
use variantgen::llm::openai::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub prompts_file: Option<PathBuf>,
    pub llm: LlmConfig,
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_ms: 120000,
        }
    }
}

impl LlmConfig {
    pub fn to_client_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key_env: self.api_key_env.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub sleep_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub intents: IndexMap<String, String>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            sleep_ms: 0,
            max_retries: 0,
            retry_backoff_ms: 1000,
            intents: default_intents(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            prompts_file: None,
            llm: LlmConfig::default(),
            generate: GenerateConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let (config, warnings) = Self::load_first(&Self::fallback_paths());
        for warning in &warnings {
            log::warn!("{}", warning);
        }
        Ok(config)
    }

    /// Candidate files in priority order: ~/.config/<project>/<project>.yml, then ./<project>.yml
    fn fallback_paths() -> Vec<PathBuf> {
        let project_name = env!("CARGO_PKG_NAME");
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(project_name).join(format!("{}.yml", project_name)));
        }
        paths.push(PathBuf::from(format!("{}.yml", project_name)));
        paths
    }

    /// First candidate that exists and parses, else defaults, plus one warning per unusable file
    fn load_first(candidates: &[PathBuf]) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return (config, warnings),
                Err(e) => warnings.push(format!("Failed to load config from {}: {:#}", path.display(), e)),
            }
        }
        log::info!("No usable config file found, using defaults");
        (Self::default(), warnings)
    }

    /// `log_level` as a filter; `None` when unset or not a level name
    pub fn log_filter(&self) -> Option<log::LevelFilter> {
        self.log_level.as_deref().and_then(|level| level.trim().parse().ok())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
