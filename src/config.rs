use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = ".apology-miner.toml";
const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
const DEFAULT_RATE_LIMIT_PAUSE_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("GitHub API token is missing or empty; set [github] token or GITHUB_TOKEN")]
    MissingToken,
}

/// Top-level configuration loaded from .apology-miner.toml.
///
/// Offline commands work with zero config; anything that talks to the API
/// needs a token, resolved from the config file first and the GITHUB_TOKEN
/// environment variable second.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,

    /// GraphQL endpoint override. Defaults to the public API.
    pub endpoint: Option<String>,

    /// Seconds to wait after a secondary rate limit before retrying.
    pub rate_limit_pause_secs: Option<u64>,
}

impl Config {
    /// Load configuration from .apology-miner.toml in the current directory,
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence, falls
    /// back to GITHUB_TOKEN. An absent or empty token is a fatal error —
    /// no network activity should happen without one.
    pub fn github_token(&self) -> Result<String, ConfigError> {
        let token = self
            .github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .unwrap_or_default();

        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(token)
    }

    pub fn endpoint(&self) -> String {
        self.github
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn rate_limit_pause(&self) -> Duration {
        Duration::from_secs(
            self.github
                .rate_limit_pause_secs
                .unwrap_or(DEFAULT_RATE_LIMIT_PAUSE_SECS),
        )
    }
}
