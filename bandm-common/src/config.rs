//! Client configuration loading
//!
//! Resolution priority, highest first:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! A missing config file is not an error; the client starts on defaults.
//! A config file that exists but does not parse is (`Error::Toml`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

pub const ENV_API_URL: &str = "BANDM_API_URL";
pub const ENV_API_TOKEN: &str = "BANDM_API_TOKEN";
pub const ENV_RANKING_POLICY: &str = "BANDM_RANKING_POLICY";
pub const ENV_LOG_LEVEL: &str = "BANDM_LOG_LEVEL";

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

/// How the member picker orders candidates for a role
///
/// Fixed for the lifetime of a planning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingPolicy {
    /// Every band member, highest priority first, unranked members last
    #[default]
    RankAll,
    /// Only members present in the priority list, in catalog order
    RestrictAndList,
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingPolicy::RankAll => f.write_str("rank-all"),
            RankingPolicy::RestrictAndList => f.write_str("restrict-and-list"),
        }
    }
}

impl FromStr for RankingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rank-all" | "rank_all" => Ok(RankingPolicy::RankAll),
            "restrict-and-list" | "restrict_and_list" | "restrict" => {
                Ok(RankingPolicy::RestrictAndList)
            }
            other => Err(Error::Config(format!("unknown ranking policy: {other}"))),
        }
    }
}

/// Effective client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_base_url: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    pub ranking_policy: RankingPolicy,
    /// Transport-level request timeout
    pub request_timeout_secs: u64,
    /// tracing filter directive (e.g. "info", "bandm_ep=debug")
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            ranking_policy: RankingPolicy::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub ranking_policy: Option<RankingPolicy>,
    pub log_level: Option<String>,
}

/// Resolves [`ClientConfig`] from CLI, environment, file and defaults
pub struct ConfigResolver {
    config_file: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver reading the platform config file, if any
    pub fn new() -> Self {
        Self {
            config_file: default_config_path(),
        }
    }

    /// Resolver reading an explicit config file
    pub fn with_config_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_file: Some(path.into()),
        }
    }

    /// Resolver that skips the config file entirely
    pub fn without_config_file() -> Self {
        Self { config_file: None }
    }

    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<ClientConfig> {
        // Priority 4 then 3: defaults, overlaid by the file
        let mut config = match &self.config_file {
            Some(path) if path.exists() => load_toml_config(path)?,
            Some(path) => {
                warn!("Config file {} not found, using defaults", path.display());
                ClientConfig::default()
            }
            None => ClientConfig::default(),
        };

        // Priority 2: environment
        if let Ok(url) = std::env::var(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            config.api_token = Some(token);
        }
        if let Ok(policy) = std::env::var(ENV_RANKING_POLICY) {
            config.ranking_policy = policy.parse()?;
        }
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        // Priority 1: command line
        if let Some(url) = &overrides.api_base_url {
            config.api_base_url = url.clone();
        }
        if let Some(token) = &overrides.api_token {
            config.api_token = Some(token.clone());
        }
        if let Some(policy) = overrides.ranking_policy {
            config.ranking_policy = policy;
        }
        if let Some(level) = &overrides.log_level {
            config.log_level = level.clone();
        }

        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        if config.api_base_url.is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        if config.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".to_string()));
        }

        debug!(
            api_base_url = %config.api_base_url,
            ranking_policy = %config.ranking_policy,
            "Resolved client configuration"
        );
        Ok(config)
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a TOML config file
pub fn load_toml_config(path: &Path) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Platform config file location
///
/// Linux prefers `~/.config/bandm/config.toml` and falls back to
/// `/etc/bandm/config.toml` when only the system-wide file exists.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("bandm").join("config.toml"));

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/bandm/config.toml");
        match user_config {
            Some(path) if path.exists() => Some(path),
            _ if system_config.exists() => Some(system_config),
            other => other,
        }
    } else {
        user_config
    }
}
