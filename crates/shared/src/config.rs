use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{PipelineError, Result};

pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const CONFIG_DIR_NAME: &str = "content-studio";

/// Settings for the model client. The API key stays optional here so that
/// scraping works without one; it is only demanded on the first model call.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub user_agent: String,
    /// Pause between sources in the bulk loop.
    pub delay: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub llm: LlmConfig,
    pub scrape: ScrapeConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let llm = LlmConfig {
            api_key: non_empty("ANTHROPIC_API_KEY"),
            model: non_empty("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: non_empty("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(parse_number(
                "LLM_TIMEOUT_SECS",
                non_empty("LLM_TIMEOUT_SECS"),
                60,
            )?),
        };

        let scrape = ScrapeConfig {
            user_agent: non_empty("SCRAPE_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            delay: Duration::from_millis(parse_number(
                "SCRAPE_DELAY_MS",
                non_empty("SCRAPE_DELAY_MS"),
                0,
            )?),
        };

        Ok(Self { llm, scrape })
    }

    fn try_load_dotenv() {
        // Current directory first, for development.
        if dotenvy::dotenv().is_ok() {
            return;
        }
        for path in dotenv_candidates(dirs::config_dir(), dirs::home_dir()) {
            if path.exists() && dotenvy::from_path(&path).is_ok() {
                return;
            }
        }
    }
}

/// `.env` files tried after the working directory, in order:
/// `<config>/content-studio/.env`, then `~/.env`.
fn dotenv_candidates(config_dir: Option<PathBuf>, home_dir: Option<PathBuf>) -> Vec<PathBuf> {
    [
        config_dir.map(|dir| dir.join(CONFIG_DIR_NAME).join(".env")),
        home_dir.map(|dir| dir.join(".env")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn parse_number(key: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            PipelineError::Configuration(format!("{key} must be a whole number, got '{raw}'"))
        }),
    }
}
