use std::time::Duration;

use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080/";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Clone)]
pub struct ClientConfig {
    /// API root all resource paths are resolved against.
    pub api_url: Url,
    /// Session token sent with every request.
    pub access_token: String,
    /// Delay between routine status fetches.
    pub poll_interval: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("access_token", &"[REDACTED]")
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                  |
    /// |---------------------------------|--------------------------|
    /// | `TYPEFAST_API_URL`              | `http://localhost:8080/` |
    /// | `TYPEFAST_ACCESS_TOKEN`         | required                 |
    /// | `TYPEFAST_POLL_INTERVAL_MS`     | `1000`                   |
    /// | `TYPEFAST_REQUEST_TIMEOUT_SECS` | `30`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("TYPEFAST_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let api_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            name: "TYPEFAST_API_URL",
            reason: e.to_string(),
        })?;
        if api_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid {
                name: "TYPEFAST_API_URL",
                reason: "must be an http(s) base URL".into(),
            });
        }

        let access_token = lookup("TYPEFAST_ACCESS_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("TYPEFAST_ACCESS_TOKEN"))?;

        let poll_interval_ms = parse_u64(
            &lookup,
            "TYPEFAST_POLL_INTERVAL_MS",
            DEFAULT_POLL_INTERVAL_MS,
        )?;
        let request_timeout_secs = parse_u64(
            &lookup,
            "TYPEFAST_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_url,
            access_token,
            poll_interval: Duration::from_millis(poll_interval_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

fn parse_u64<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            reason: format!("expected a non-negative integer, got '{raw}'"),
        }),
    }
}
