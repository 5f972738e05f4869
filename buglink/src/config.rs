//! Configuration for the tracker connection and annotation pass
//!
//! Configuration is an explicit value object handed to [`crate::session::Session`]
//! and [`crate::annotate::Annotator`] constructors; there is no hidden
//! process-wide lookup. Values are loaded from defaults, then
//! environment variables, then an optional YAML file (highest
//! precedence).

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BuglinkError, Result};
use crate::pattern::{self, DEFAULT_ID_PATTERN};

/// Placeholder base URL used when the administrator has not set one
pub const DEFAULT_BASE_URL: &str = "http://bugzilla";

const ENV_PREFIX: &str = "BUGLINK";

/// What to do with a pattern match that yields no parseable bug ID
/// (e.g. a version string like "4.5.6" matched by a lenient pattern).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Link the raw matched text verbatim (lenient)
    #[default]
    LinkRaw,
    /// Leave the match unannotated (strict)
    Skip,
}

impl FromStr for FallbackPolicy {
    type Err = BuglinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "link-raw" => Ok(FallbackPolicy::LinkRaw),
            "skip" => Ok(FallbackPolicy::Skip),
            other => Err(BuglinkError::Config(format!(
                "unknown fallback policy '{other}', expected 'link-raw' or 'skip'"
            ))),
        }
    }
}

/// Tracker connection and annotation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Base URL of the Bugzilla installation (no trailing `/xmlrpc.cgi`)
    pub base_url: String,
    /// Login for authenticated access; anonymous when absent
    pub username: Option<String>,
    /// Password for authenticated access; anonymous when absent
    pub password: Option<String>,
    /// Regular expression locating bug-ID tokens in changelog text
    pub id_pattern: String,
    /// Fetch bug summaries and render them as tooltips
    pub use_tooltips: bool,
    /// Policy for matches that carry no parseable ID
    pub fallback: FallbackPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            password: None,
            id_pattern: DEFAULT_ID_PATTERN.to_string(),
            use_tooltips: false,
            fallback: FallbackPolicy::default(),
        }
    }
}

impl TrackerConfig {
    /// Build a configuration from defaults overlaid with `BUGLINK_*`
    /// environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.base_url = load_env_string("BASE_URL", &config.base_url);
        config.username = load_env_optional("USERNAME").or(config.username);
        config.password = load_env_optional("PASSWORD").or(config.password);
        config.id_pattern = load_env_string("ID_PATTERN", &config.id_pattern);
        config.use_tooltips = load_env_parsed("USE_TOOLTIPS", config.use_tooltips);
        config.fallback = load_env_parsed("FALLBACK", config.fallback);
        config
    }

    /// Validate the configuration for administrator feedback.
    ///
    /// Checks the credential invariant (username and password both
    /// present or both absent), the base URL and the ID pattern, with
    /// a distinct message for each failure.
    pub fn validate(&self) -> Result<()> {
        match (&self.username, &self.password) {
            (Some(_), None) => {
                return Err(BuglinkError::Config(
                    "username set without a password".to_string(),
                ))
            }
            (None, Some(_)) => {
                return Err(BuglinkError::Config(
                    "password set without a username".to_string(),
                ))
            }
            _ => {}
        }

        if self.base_url.trim().is_empty() {
            return Err(BuglinkError::Config("no tracker base URL".to_string()));
        }
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| BuglinkError::Config(format!("not a valid URL '{}': {e}", self.base_url)))?;
        if url.host_str().is_none() {
            return Err(BuglinkError::Config(format!(
                "base URL '{}' has no host",
                self.base_url
            )));
        }

        pattern::compile_pattern(&self.id_pattern)?;
        Ok(())
    }

    /// Whether credentials are configured (non-anonymous mode)
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

fn load_env_string(suffix: &str, default: &str) -> String {
    env::var(format!("{ENV_PREFIX}_{suffix}")).unwrap_or_else(|_| default.to_string())
}

fn load_env_optional<T: FromStr>(suffix: &str) -> Option<T> {
    env::var(format!("{ENV_PREFIX}_{suffix}"))
        .ok()
        .and_then(|v| v.parse().ok())
}

fn load_env_parsed<T: FromStr>(suffix: &str, default: T) -> T {
    load_env_optional(suffix).unwrap_or(default)
}

/// Configuration loaded from a buglink YAML file
///
/// All fields are optional; present fields override the running
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YamlConfig {
    /// Tracker base URL
    pub base_url: Option<String>,
    /// Login for authenticated access
    pub username: Option<String>,
    /// Password for authenticated access
    pub password: Option<String>,
    /// Bug-ID pattern
    pub id_pattern: Option<String>,
    /// Tooltip toggle
    pub use_tooltips: Option<bool>,
    /// Policy for matches without a parseable ID
    pub fallback: Option<FallbackPolicy>,
}

impl YamlConfig {
    /// Load YAML configuration from a file path
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("loading configuration from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let config: YamlConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply present fields onto an existing configuration
    pub fn apply_to_config(&self, config: &mut TrackerConfig) {
        if let Some(ref base_url) = self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(ref username) = self.username {
            config.username = Some(username.clone());
        }
        if let Some(ref password) = self.password {
            config.password = Some(password.clone());
        }
        if let Some(ref id_pattern) = self.id_pattern {
            config.id_pattern = id_pattern.clone();
        }
        if let Some(use_tooltips) = self.use_tooltips {
            config.use_tooltips = use_tooltips;
        }
        if let Some(fallback) = self.fallback {
            config.fallback = fallback;
        }
    }
}
