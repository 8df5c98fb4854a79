//! Configuration handling for the service.
//!
//! Everything is read from environment variables with development defaults.
//! `Config::from_env` performs the loading and validation; the individual
//! values are exposed through getters so the rest of the crate never touches
//! the environment directly.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_USER_AGENT: &str = "FETCH_USER_AGENT";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "CONNECT_TIMEOUT_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";
pub const ENV_MAX_REDIRECTS: &str = "MAX_REDIRECTS";
pub const ENV_CACHE_MAX_AGE_SECS: &str = "CACHE_MAX_AGE_SECS";
pub const ENV_AVATAR_PROFILE_URL: &str = "AVATAR_PROFILE_URL";

/// Placeholder substituted with the requested username in the avatar
/// profile URL template.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_USER_AGENT: &str = "UnfurlBot/0.1 (+https://github.com/unfurl)";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: u64 = 5 * 1024 * 1024; // 5MB
const DEFAULT_MAX_REDIRECTS: usize = 10;
const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 3600;
const DEFAULT_AVATAR_PROFILE_URL: &str = "https://github.com/{username}";

/// Service runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    bind_addr: String,
    user_agent: String,
    connect_timeout: Duration,
    fetch_timeout: Duration,
    max_body_bytes: u64,
    max_redirects: usize,
    cache_max_age_secs: u64,
    avatar_profile_url: String,
}

impl Config {
    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let user_agent =
            env::var(ENV_USER_AGENT).unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let connect_timeout_secs = parse_var(
            ENV_CONNECT_TIMEOUT_SECS,
            "connect_timeout_secs",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;
        let fetch_timeout_secs = parse_var(
            ENV_FETCH_TIMEOUT_SECS,
            "fetch_timeout_secs",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;
        let max_body_bytes = parse_var(ENV_MAX_BODY_BYTES, "max_body_bytes", DEFAULT_MAX_BODY_BYTES)?;
        let max_redirects = parse_var(ENV_MAX_REDIRECTS, "max_redirects", DEFAULT_MAX_REDIRECTS)?;
        let cache_max_age_secs = parse_var(
            ENV_CACHE_MAX_AGE_SECS,
            "cache_max_age_secs",
            DEFAULT_CACHE_MAX_AGE_SECS,
        )?;
        let avatar_profile_url = env::var(ENV_AVATAR_PROFILE_URL)
            .unwrap_or_else(|_| DEFAULT_AVATAR_PROFILE_URL.to_string());

        if fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        Self::default()
            .with_bind_addr(bind_addr)
            .with_user_agent(user_agent)
            .with_timeouts(
                Duration::from_secs(connect_timeout_secs),
                Duration::from_secs(fetch_timeout_secs),
            )
            .with_max_body_bytes(max_body_bytes)
            .with_max_redirects(max_redirects)
            .with_cache_max_age_secs(cache_max_age_secs)
            .with_avatar_profile_url(avatar_profile_url)
    }

    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, total: Duration) -> Self {
        self.connect_timeout = connect;
        self.fetch_timeout = total;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_cache_max_age_secs(mut self, secs: u64) -> Self {
        self.cache_max_age_secs = secs;
        self
    }

    /// Set the avatar profile URL template. It must contain `{username}`.
    pub fn with_avatar_profile_url(
        mut self,
        template: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let template = template.into();
        if !template.contains(USERNAME_PLACEHOLDER) {
            return Err(ConfigError::InvalidValue {
                field: "avatar_profile_url",
                reason: format!("template must contain {}", USERNAME_PLACEHOLDER),
            });
        }
        self.avatar_profile_url = template;
        Ok(self)
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// User-Agent sent on outbound fetches.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
    /// Upper bound on one outbound fetch, connect through body read.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    pub fn max_body_bytes(&self) -> u64 {
        self.max_body_bytes
    }
    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }
    /// `max-age` advertised on successful previews.
    pub fn cache_max_age_secs(&self) -> u64 {
        self.cache_max_age_secs
    }
    pub fn avatar_profile_url(&self) -> &str {
        &self.avatar_profile_url
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            cache_max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
            avatar_profile_url: DEFAULT_AVATAR_PROFILE_URL.to_string(),
        }
    }
}

fn parse_var<T: FromStr>(key: &str, field: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field,
            reason: format!("expected a non-negative integer, got '{}'", raw),
        }),
        Err(_) => Ok(default),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
