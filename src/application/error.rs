//! Application-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::infrastructure::InfraError;

/// Application errors wrap remote failures and add service-level conditions.
#[derive(Error, Debug)]
pub enum ApplicationError {
    /// Remote call failure, surfaced unchanged
    #[error("{0}")]
    Remote(#[from] InfraError),

    #[error("{operation} is not implemented by the {backend} backend")]
    NotImplemented {
        operation: &'static str,
        backend: &'static str,
    },

    #[error("no logs for {0}")]
    NoLogs(String),

    #[error("missing log stream for {0}")]
    MissingLogStream(String),

    #[error("retry build returned no build for {0}")]
    NoRetriedBuild(String),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
