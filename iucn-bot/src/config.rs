//! Configuration resolution for iucn-bot
//!
//! Settings come from a TOML file (`~/.config/iucnbot/config.toml` unless a
//! path is given), with compiled defaults for anything it leaves out.
//! Secrets are resolved per setting with priority CLI → ENV → TOML.

use crate::services::assessed_pages::DEFAULT_SKIP_LIST;
use crate::services::mediawiki_client::NLWIKI_ENDPOINT;
use crate::services::redlist_client::{RATE_LIMIT_MS, REDLIST_BASE_URL};
use iucn_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const ENV_REDLIST_TOKEN: &str = "IUCNBOT_REDLIST_TOKEN";
pub const ENV_WIKI_USER: &str = "IUCNBOT_WIKI_USER";
pub const ENV_WIKI_PASSWORD: &str = "IUCNBOT_WIKI_PASSWORD";

/// Species categories on the Dutch Wikipedia
pub const DEFAULT_CATEGORIES: [&str; 2] = [
    "Categorie:Wikipedia:Diersoorten",
    "Categorie:Wikipedia:Plantenlemma",
];

/// Seconds between saved edits (4 edits per minute)
pub const DEFAULT_EDIT_INTERVAL_SECS: u64 = 15;

/// Bot configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub wiki: WikiConfig,
    pub redlist: RedListConfig,
    pub template_engine: TemplateEngineConfig,
    /// Pause after every saved edit, in seconds
    pub edit_interval_secs: u64,
    /// File listing pages finished in earlier runs
    pub skip_list: PathBuf,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    pub endpoint: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedListConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Minimum spacing between API requests, in milliseconds
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateEngineConfig {
    pub extract: PathBuf,
    pub merge: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            wiki: WikiConfig::default(),
            redlist: RedListConfig::default(),
            template_engine: TemplateEngineConfig::default(),
            edit_interval_secs: DEFAULT_EDIT_INTERVAL_SECS,
            skip_list: PathBuf::from(DEFAULT_SKIP_LIST),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            endpoint: NLWIKI_ENDPOINT.to_string(),
            user: None,
            password: None,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Default for RedListConfig {
    fn default() -> Self {
        Self {
            base_url: REDLIST_BASE_URL.to_string(),
            token: None,
            min_interval_ms: RATE_LIMIT_MS,
        }
    }
}

impl Default for TemplateEngineConfig {
    fn default() -> Self {
        Self {
            extract: PathBuf::from("mwparserfromhell/get_taxobox_info"),
            merge: PathBuf::from("mwparserfromhell/put_taxobox_info"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl BotConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load the configuration file
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used when present and compiled defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!("Config file not found: {:?}", path)));
                }
                path.to_path_buf()
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => path,
                None => {
                    info!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Reject settings the run loop cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.wiki.categories.iter().all(|c| !is_valid_key(c)) {
            return Err(Error::Config("No categories configured".to_string()));
        }
        if !is_valid_key(&self.wiki.endpoint) {
            return Err(Error::Config("Wiki endpoint is empty".to_string()));
        }
        if !is_valid_key(&self.redlist.base_url) {
            return Err(Error::Config("Red List base URL is empty".to_string()));
        }
        Ok(())
    }

    pub fn edit_interval(&self) -> Duration {
        Duration::from_secs(self.edit_interval_secs)
    }
}

/// `~/.config/iucnbot/config.toml` (platform config dir)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("iucnbot").join("config.toml"))
}

/// Resolve one setting from CLI, environment and TOML, in that order
///
/// Blank values count as absent.
pub fn resolve_setting(
    name: &str,
    cli_value: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Result<String> {
    let env_value = std::env::var(env_var_name).ok();

    let candidates = [
        ("command line", cli_value),
        ("environment", env_value.as_deref()),
        ("TOML", toml_value),
    ];
    let sources: Vec<&str> = candidates
        .iter()
        .filter(|(_, value)| value.is_some_and(is_valid_key))
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "{} found in multiple sources: {}. Using {} (highest priority).",
            name,
            sources.join(", "),
            sources[0]
        );
    }

    for (source, value) in candidates {
        if let Some(value) = value.filter(|v| is_valid_key(v)) {
            info!("{} loaded from {}", name, source);
            return Ok(value.to_string());
        }
    }

    Err(Error::Config(format!(
        "{} not configured. Set it with one of:\n\
         1. Command line option\n\
         2. Environment: {}=...\n\
         3. TOML config: {}",
        name,
        env_var_name,
        default_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "config.toml".to_string())
    )))
}

/// Red List API token
pub fn resolve_redlist_token(cli_value: Option<&str>, config: &BotConfig) -> Result<String> {
    resolve_setting(
        "Red List API token",
        cli_value,
        ENV_REDLIST_TOKEN,
        config.redlist.token.as_deref(),
    )
}

/// Wiki bot user name and password
pub fn resolve_wiki_credentials(
    cli_user: Option<&str>,
    cli_password: Option<&str>,
    config: &BotConfig,
) -> Result<(String, String)> {
    let user = resolve_setting("Wiki user", cli_user, ENV_WIKI_USER, config.wiki.user.as_deref())?;
    let password = resolve_setting(
        "Wiki password",
        cli_password,
        ENV_WIKI_PASSWORD,
        config.wiki.password.as_deref(),
    )?;
    Ok((user, password))
}

/// Non-empty, non-whitespace
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
