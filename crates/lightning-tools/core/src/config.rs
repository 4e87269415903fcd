use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PROXY: &str = "https://api.getalby.com/lnurl";
pub const DEFAULT_RATES_URL: &str = "https://getalby.com/api/rates";
const ENV_PREFIX: &str = "LIGHTNING_TOOLS_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(err.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Relay used for discovery and invoice generation. `None` (or an empty
    /// string in a config file) talks to the recipient's domain directly.
    pub proxy: Option<String>,
    pub verify_retry: RetryPolicy,
    pub keysend_validation: KeysendValidation,
    pub rates_url: String,
    pub user_agent: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: Some(DEFAULT_PROXY.to_string()),
            verify_retry: RetryPolicy::default(),
            keysend_validation: KeysendValidation::default(),
            rates_url: DEFAULT_RATES_URL.to_string(),
            user_agent: None,
        }
    }
}

impl Config {
    /// Loads the defaults, then the optional TOML file, then
    /// `LIGHTNING_TOOLS_*` environment variables. Nested keys use `__`,
    /// e.g. `LIGHTNING_TOOLS_VERIFY_RETRY__MAX_ATTEMPTS=5`.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(config_file) = config_file {
            figment = figment.merge(Toml::file(config_file));
        }
        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?)
    }

    /// Config without a proxy.
    pub fn direct() -> Self {
        Self {
            proxy: None,
            ..Default::default()
        }
    }

    pub fn proxy_endpoint(&self) -> Option<&str> {
        self.proxy
            .as_deref()
            .map(|proxy| proxy.trim_end_matches('/'))
            .filter(|proxy| !proxy.is_empty())
    }
}

/// Bounded, fixed-delay retry used when polling an LNURL-verify endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// How strictly keysend discovery documents are checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeysendValidation {
    /// Custom records are optional.
    #[default]
    Relaxed,
    /// The first custom record must use the Podcasting 2.0 key `696969`.
    Podcasting2,
}
