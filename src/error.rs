use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt::{self, Write};
use thiserror::Error;

use crate::nls::Messages;

/// Formats an error and its entire source chain with each error on a new line
///
/// This produces output like:
/// ```text
/// Error message
///   Caused by: First cause
///   Caused by: Root cause
/// ```
pub fn format_error_chain(err: &dyn std::error::Error) -> String {
    let mut output = String::new();
    write!(&mut output, "{}", err).ok();

    let mut source = err.source();
    while let Some(err) = source {
        write!(&mut output, "\n  Caused by: {}", err).ok();
        source = err.source();
    }

    output
}

/// Formats an anyhow::Error with its full chain
pub fn format_anyhow_chain(err: &anyhow::Error) -> String {
    let mut output = String::new();

    let chain: Vec<_> = err.chain().collect();

    if let Some((first, rest)) = chain.split_first() {
        write!(&mut output, "{}", first).ok();
        for cause in rest {
            write!(&mut output, "\n  Caused by: {}", cause).ok();
        }
    }

    output
}

/// A rule violation attached to a form field.
///
/// `rule` is a message key (`validation-job-name`, `already-exist`,
/// `travis-job`, ...) and `parameters` are the values substituted into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub rule: String,
    pub parameters: Vec<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, rule: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            parameters,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.rule)?;
        if !self.parameters.is_empty() {
            write!(f, " ({})", self.parameters.join(", "))?;
        }
        Ok(())
    }
}

/// Integration failures the Travis backend surfaces to users. Each one has an
/// entry in the `error` table of the message bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravisFailure {
    /// Server unreachable
    Connection,
    /// Bad credentials
    Login,
    /// Credentials lack the rights to read jobs
    Rights,
}

impl TravisFailure {
    pub fn key(&self) -> &'static str {
        match self {
            TravisFailure::Connection => "travis-connection",
            TravisFailure::Login => "travis-login",
            TravisFailure::Rights => "travis-rights",
        }
    }
}

impl fmt::Display for TravisFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Central application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    #[error("Database migration error: {0}")]
    DatabaseMigration(String),

    /// HTTP client errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization/Deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors with context
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A field failed validation; reported per field, never as a crash
    #[error("Validation failed: {0}")]
    Validation(ValidationError),

    /// An operation was refused for business reasons
    #[error("{0}")]
    Business(String),

    #[error("Travis error: {0}")]
    Travis(TravisFailure),
}

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &str, rule: &str, parameters: Vec<String>) -> Self {
        AppError::Validation(ValidationError::new(field, rule, parameters))
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        log::error!("HTTP error response: {}", self);

        let status_code = self.status_code();

        let body = match self {
            // Same shape the console's validation manager consumes
            AppError::Validation(error) => serde_json::json!({
                "errors": {
                    error.field.as_str(): [{
                        "rule": error.rule,
                        "parameters": error.parameters,
                    }]
                }
            }),
            AppError::Travis(failure) => serde_json::json!({
                "code": failure.key(),
                "message": Messages::root().error(failure.key()).unwrap_or(failure.key()),
                "status": status_code.as_u16(),
            }),
            _ => serde_json::json!({
                "error": self.to_string(),
                "status": status_code.as_u16(),
            }),
        };

        HttpResponse::build(status_code)
            .content_type("application/json")
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_)
            | AppError::DatabasePool(_)
            | AppError::DatabaseMigration(_)
            | AppError::Json(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Url(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,

            AppError::NotFound(_) => StatusCode::NOT_FOUND,

            AppError::InvalidInput(_) | AppError::Validation(_) | AppError::Business(_) => {
                StatusCode::BAD_REQUEST
            }

            AppError::Travis(TravisFailure::Login) => StatusCode::UNAUTHORIZED,
            AppError::Travis(TravisFailure::Rights) => StatusCode::FORBIDDEN,
            AppError::Travis(TravisFailure::Connection) | AppError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}
