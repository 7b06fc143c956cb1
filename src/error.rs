//! Error types for the trading-competition agent

use crate::api::schema::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: u16,
        message: String,
        body: String,
    },

    #[error("{operation} failed: {source}")]
    Facade {
        operation: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`], looking through facade wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    HttpStatus,
    Config,
    Agent,
    Json,
}

impl Error {
    /// Wrap this error as a failure of the named client operation.
    pub fn in_operation(self, operation: &'static str) -> Self {
        Error::Facade {
            operation,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any facade wrapping removed.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Facade { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Network(_) => ErrorKind::Network,
            Error::HttpStatus { .. } => ErrorKind::HttpStatus,
            Error::Config(_) => ErrorKind::Config,
            Error::Agent(_) => ErrorKind::Agent,
            Error::Json(_) => ErrorKind::Json,
            Error::Facade { .. } => unreachable!("root_cause never returns a facade error"),
        }
    }

    /// HTTP status code, if the root cause is a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self.root_cause() {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Field-level validation detail, if the root cause is a validation failure.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self.root_cause() {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
