use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures while retrieving a product page.
///
/// Only `Transient` is retried; `Exhausted` is what callers see once the
/// retry budget is spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transient failure: {0}")]
    Transient(String),

    #[error("all {attempts} attempts failed, last error: {last_cause}")]
    Exhausted { attempts: u32, last_cause: String },

    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request could not be built: {0}")]
    Request(String),
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }

    /// Classify a reqwest failure. Builder errors are programmer errors and
    /// must not be retried; everything else on the wire is.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_builder() {
            FetchError::Request(err.to_string())
        } else {
            FetchError::Transient(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notifier transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("message rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("channel {0} not found")]
    ChannelNotFound(String),

    #[error("credentials rejected by the messaging service")]
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, AppError>;
