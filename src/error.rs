//! Error taxonomy for the alert monitor
//!
//! Only [`ConfigError`] is fatal. Everything else is scoped to a single row or
//! a single cycle and is logged by the runner before it moves on.

use thiserror::Error;

/// Startup configuration failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

/// Malformed condition text on an alert row
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Could not parse condition '{0}': no known comparator")]
    UnknownComparator(String),

    #[error("Could not parse condition '{condition}': invalid threshold '{threshold}'")]
    InvalidThreshold { condition: String, threshold: String },
}

/// A record that lacks one of the mandatory alert fields
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Record {record} has no ticker")]
    MissingTicker { record: String },

    #[error("Record {record} (ticker {ticker}) has no condition")]
    MissingCondition { record: String, ticker: String },
}

/// Record source or quote source failures
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unreadable payload: {reason}")]
    Decode {
        service: &'static str,
        reason: String,
    },

    #[error("Invalid {service} URL: {source}")]
    Url {
        service: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Notification dispatch failures
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notification rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Notification rejected: {0}")]
    Rejected(String),

    #[error("Invalid notification URL: {0}")]
    Url(#[from] url::ParseError),
}
