//! Application configuration loaded from environment variables.

use std::time::Duration;

use common::SessionId;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";
const IDLE_SWEEP_PERIOD: Duration = Duration::from_secs(60);
const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Errors raised while reading the configuration. All of them are fatal at
/// start-up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `OPERATOR_CHAT_ID`: where confirmed orders are delivered (required)
/// - `PAYMENT_TOKEN`: payment provider token; online payment is disabled without it
/// - `DEVELOPER_MODE`: `true` enables the debug commands (default: `false`)
/// - `SESSION_TTL_SECS`: idle time after which an unfinished order is cancelled
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub operator_chat_id: SessionId,
    pub payment_token: Option<String>,
    pub developer_mode: bool,
    pub session_ttl: Option<Duration>,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let operator_chat_id = value("OPERATOR_CHAT_ID")
            .ok_or(ConfigError::Missing("OPERATOR_CHAT_ID"))?;
        let operator_chat_id =
            operator_chat_id
                .parse::<SessionId>()
                .map_err(|_| ConfigError::Invalid {
                    name: "OPERATOR_CHAT_ID",
                    value: operator_chat_id.clone(),
                })?;

        let session_ttl = match value("SESSION_TTL_SECS") {
            None => None,
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "SESSION_TTL_SECS",
                    value: raw.clone(),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
        };

        Ok(Self {
            host: value("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: value("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            log_level: value("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            operator_chat_id,
            payment_token: value("PAYMENT_TOKEN"),
            developer_mode: value("DEVELOPER_MODE")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            session_ttl,
        })
    }

    /// Defaults for everything except the required operator destination.
    pub fn for_operator(operator_chat_id: SessionId) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            operator_chat_id,
            payment_token: None,
            developer_mode: false,
            session_ttl: None,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Interval between two session sweeps. Idle sessions are swept even
    /// when order expiry is off.
    pub fn sweep_period(&self) -> Duration {
        match self.session_ttl {
            Some(ttl) => (ttl / 4).clamp(MIN_SWEEP_PERIOD, IDLE_SWEEP_PERIOD),
            None => IDLE_SWEEP_PERIOD,
        }
    }

    /// Returns true if a payment provider token is configured.
    pub fn payments_enabled(&self) -> bool {
        self.payment_token.is_some()
    }
}
