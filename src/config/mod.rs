//! Environment-driven configuration
//!
//! Everything is read once at startup into [`Settings`], which is then handed
//! to each client explicitly. Nothing reads the environment after that.

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

pub const DEFAULT_CHECK_INTERVAL_SECONDS: u64 = 300;
pub const DEFAULT_RECOVERY_DELAY_SECONDS: u64 = 60;

pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
pub const DEFAULT_QUOTE_API_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

const REQUIRED_VARS: [&str; 4] = [
    "NOTION_TOKEN",
    "DATABASE_ID",
    "TELEGRAM_BOT_TOKEN",
    "TELEGRAM_CHAT_ID",
];

/// Deployment environment name (`APP_ENV`), used to pick the log format
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct NotionSettings {
    pub token: String,
    pub database_id: String,
    pub api_url: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct QuoteSettings {
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: String,
}

/// Cadence of the cycle runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    pub recovery_delay: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECONDS),
            recovery_delay: Duration::from_secs(DEFAULT_RECOVERY_DELAY_SECONDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub notion: NotionSettings,
    pub quotes: QuoteSettings,
    pub telegram: TelegramSettings,
    pub monitor: MonitorSettings,
    /// Per-request timeout; `None` leaves requests unbounded
    pub http_timeout: Option<Duration>,
    pub metrics_port: Option<u16>,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup
    ///
    /// Every missing required variable is collected before failing, so the
    /// error names all of them at once. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|&key| get(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |key: &str| get(key).unwrap_or_default();

        let poll_interval = parse_seconds(
            "CHECK_INTERVAL",
            get("CHECK_INTERVAL"),
            DEFAULT_CHECK_INTERVAL_SECONDS,
        )?;
        let recovery_delay = parse_seconds(
            "RECOVERY_DELAY_SECONDS",
            get("RECOVERY_DELAY_SECONDS"),
            DEFAULT_RECOVERY_DELAY_SECONDS,
        )?;
        let http_timeout = get("HTTP_TIMEOUT_SECONDS")
            .map(|raw| positive_seconds("HTTP_TIMEOUT_SECONDS", raw))
            .transpose()?;

        let metrics_port = match get("METRICS_PORT") {
            Some(raw) => Some(raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "METRICS_PORT".to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            notion: NotionSettings {
                token: required("NOTION_TOKEN"),
                database_id: required("DATABASE_ID"),
                api_url: get("NOTION_API_URL")
                    .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string()),
                api_version: DEFAULT_NOTION_VERSION.to_string(),
            },
            quotes: QuoteSettings {
                api_url: get("QUOTE_API_URL")
                    .unwrap_or_else(|| DEFAULT_QUOTE_API_URL.to_string()),
            },
            telegram: TelegramSettings {
                bot_token: required("TELEGRAM_BOT_TOKEN"),
                chat_id: required("TELEGRAM_CHAT_ID"),
                api_url: get("TELEGRAM_API_URL")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            },
            monitor: MonitorSettings {
                poll_interval,
                recovery_delay,
            },
            http_timeout,
            metrics_port,
        })
    }
}

/// Parse a positive number of seconds, falling back to `default` when unset
fn parse_seconds(var: &str, raw: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    match raw {
        Some(raw) => positive_seconds(var, raw),
        None => Ok(Duration::from_secs(default)),
    }
}

fn positive_seconds(var: &str, raw: String) -> Result<Duration, ConfigError> {
    let seconds = raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
        var: var.to_string(),
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    if seconds == 0 {
        return Err(ConfigError::Invalid {
            var: var.to_string(),
            value: raw,
            reason: "must be > 0".to_string(),
        });
    }

    Ok(Duration::from_secs(seconds))
}
