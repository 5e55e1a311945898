//! Environment-driven configuration for the server and the board client.
//!
//! Both configs are read through a lookup function so tests can supply
//! values without touching the process environment.

use axum::http::HeaderValue;
use reqwest::Url;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use crate::task::domain::{OwnerId, TaskDomainError};

/// Address the server binds when `TASKBOARD_BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Request timeout used by the board client when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The bind address is not a socket address.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        /// Raw configured value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },

    /// An entry of the token table is not `token=user`.
    #[error("invalid auth token entry '{0}', expected token=user")]
    InvalidTokenEntry(String),

    /// An entry of the token table names a blank user.
    #[error("invalid auth token owner: {0}")]
    InvalidTokenOwner(#[source] TaskDomainError),

    /// The client origin is not a valid header value.
    #[error("invalid client origin '{0}'")]
    InvalidOrigin(String),

    /// A required variable is missing.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// The server base URL does not parse.
    #[error("invalid base URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// Raw configured value.
        value: String,
        /// Parse failure description.
        reason: String,
    },

    /// The request timeout is not a positive number of seconds.
    #[error("invalid request timeout '{0}', expected whole seconds")]
    InvalidTimeout(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_addr: SocketAddr,
    /// `PostgreSQL` connection string; the in-memory store is used when
    /// absent.
    pub database_url: Option<String>,
    /// Bearer tokens accepted by the static authenticator.
    pub auth_tokens: HashMap<String, OwnerId>,
    /// Browser origin allowed by CORS.
    pub client_origin: Option<HeaderValue>,
}

impl ServerConfig {
    /// Reads the server configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but malformed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the server configuration through `lookup`.
    ///
    /// Recognised keys: `TASKBOARD_BIND_ADDR`, `DATABASE_URL`,
    /// `TASKBOARD_AUTH_TOKENS` (comma-separated `token=user` pairs) and
    /// `TASKBOARD_CLIENT_ORIGIN`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let raw_addr = non_blank(lookup("TASKBOARD_BIND_ADDR"))
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw_addr
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let auth_tokens = non_blank(lookup("TASKBOARD_AUTH_TOKENS"))
            .map(|raw| parse_token_table(&raw))
            .transpose()?
            .unwrap_or_default();

        let client_origin = non_blank(lookup("TASKBOARD_CLIENT_ORIGIN"))
            .map(|raw| HeaderValue::from_str(&raw).map_err(|_| ConfigError::InvalidOrigin(raw)))
            .transpose()?;

        Ok(Self {
            bind_addr,
            database_url: non_blank(lookup("DATABASE_URL")),
            auth_tokens,
            client_origin,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
}

fn parse_token_table(raw: &str) -> ConfigResult<HashMap<String, OwnerId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (token, user) = entry
                .split_once('=')
                .filter(|(token, _)| !token.trim().is_empty())
                .ok_or_else(|| ConfigError::InvalidTokenEntry(entry.to_owned()))?;
            let owner = OwnerId::new(user).map_err(ConfigError::InvalidTokenOwner)?;
            Ok((token.trim().to_owned(), owner))
        })
        .collect()
}

/// Board client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, for example `http://127.0.0.1:5000/`.
    pub base_url: Url,
    /// Bearer token presented on every request.
    pub token: String,
    /// Upper bound on one request; a hung request fails after this long.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Creates a client configuration with the default timeout.
    #[must_use]
    pub const fn new(base_url: Url, token: String) -> Self {
        Self {
            base_url,
            token,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Reads the client configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// variable is malformed.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the client configuration through `lookup`.
    ///
    /// Recognised keys: `TASKBOARD_BASE_URL` and `TASKBOARD_TOKEN`
    /// (required) and `TASKBOARD_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// variable is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let raw_url = non_blank(lookup("TASKBOARD_BASE_URL"))
            .ok_or(ConfigError::Missing("TASKBOARD_BASE_URL"))?;
        let base_url = Url::parse(&raw_url).map_err(|err| ConfigError::InvalidBaseUrl {
            value: raw_url.clone(),
            reason: err.to_string(),
        })?;
        let token =
            non_blank(lookup("TASKBOARD_TOKEN")).ok_or(ConfigError::Missing("TASKBOARD_TOKEN"))?;
        let request_timeout = non_blank(lookup("TASKBOARD_REQUEST_TIMEOUT_SECS"))
            .map(|raw| {
                raw.parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::InvalidTimeout(raw))
            })
            .transpose()?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self {
            base_url,
            token,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ClientConfig, ConfigError, DEFAULT_BIND_ADDR, DEFAULT_REQUEST_TIMEOUT, ServerConfig,
    };
    use rstest::rstest;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let table: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| table.get(key).cloned()
    }

    #[rstest]
    fn server_defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).expect("valid defaults");

        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.database_url.is_none());
        assert!(config.auth_tokens.is_empty());
        assert!(config.client_origin.is_none());
    }

    #[rstest]
    fn server_parses_token_table() {
        let config = ServerConfig::from_lookup(lookup_from(&[(
            "TASKBOARD_AUTH_TOKENS",
            "abc=alice, def=bob",
        )]))
        .expect("valid token table");

        let alice = config.auth_tokens.get("abc").map(|owner| owner.as_str());
        let bob = config.auth_tokens.get("def").map(|owner| owner.as_str());
        assert_eq!(alice, Some("alice"));
        assert_eq!(bob, Some("bob"));
    }

    #[rstest]
    #[case("no-separator")]
    #[case("=alice")]
    #[case("abc=  ")]
    fn server_rejects_malformed_token_entries(#[case] entry: &str) {
        let result = ServerConfig::from_lookup(lookup_from(&[("TASKBOARD_AUTH_TOKENS", entry)]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidTokenEntry(_) | ConfigError::InvalidTokenOwner(_))
        ));
    }

    #[rstest]
    fn server_rejects_bad_bind_address() {
        let result =
            ServerConfig::from_lookup(lookup_from(&[("TASKBOARD_BIND_ADDR", "localhost")]));
        assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
    }

    #[rstest]
    fn client_requires_base_url_and_token() {
        let result = ClientConfig::from_lookup(lookup_from(&[("TASKBOARD_TOKEN", "abc")]));
        assert!(matches!(result, Err(ConfigError::Missing("TASKBOARD_BASE_URL"))));
    }

    #[rstest]
    #[case(None, DEFAULT_REQUEST_TIMEOUT)]
    #[case(Some("3"), Duration::from_secs(3))]
    fn client_reads_request_timeout(#[case] raw: Option<&str>, #[case] expected: Duration) {
        let mut pairs = vec![
            ("TASKBOARD_BASE_URL", "http://127.0.0.1:5000/"),
            ("TASKBOARD_TOKEN", "abc"),
        ];
        if let Some(value) = raw {
            pairs.push(("TASKBOARD_REQUEST_TIMEOUT_SECS", value));
        }

        let config = ClientConfig::from_lookup(lookup_from(&pairs)).expect("valid client config");

        assert_eq!(config.request_timeout, expected);
    }

    #[rstest]
    #[case("0")]
    #[case("soon")]
    fn client_rejects_bad_timeout(#[case] raw: &str) {
        let result = ClientConfig::from_lookup(lookup_from(&[
            ("TASKBOARD_BASE_URL", "http://127.0.0.1:5000/"),
            ("TASKBOARD_TOKEN", "abc"),
            ("TASKBOARD_REQUEST_TIMEOUT_SECS", raw),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(_))));
    }
}
