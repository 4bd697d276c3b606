//! Error type definitions for the EPG generator
//!
//! Every failure that aborts a run is represented here. Per-programme
//! problems (an unparseable timestamp, a missing synopsis) never become
//! errors: the transformer recovers from them locally.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream fetch errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File publishing errors
    #[error("Output error: {path} - {message}")]
    Output { path: String, message: String },

    /// XML serialization errors
    #[error("XML error: {message}")]
    Xml { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Upstream fetch specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request exceeded the configured deadline
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-success HTTP status from the upstream API
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Body could not be decoded as the expected JSON
    #[error("Parse error: {source_type} - {message}")]
    ParseError { source_type: String, message: String },

    /// The expected top-level data key is absent
    #[error("Missing top-level key '{key}' in response")]
    MissingKey { key: String },

    /// The listings endpoint produced no channels at all
    #[error("No channels returned by {url}")]
    NoChannels { url: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an output error for the given path
    pub fn output<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::Output {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an XML serialization error
    pub fn xml<S: Into<String>>(message: S) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }
}

impl SourceError {
    /// Create a parse error for a named payload type
    pub fn parse<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        }
    }
}
