//! Infrastructure-level errors (remote calls, runtime)

use thiserror::Error;

/// Errors raised at the I/O boundary: AWS calls and the runtime driving them.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{operation}: {message}")]
    Sdk {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: cancelled")]
    Cancelled { operation: &'static str },

    #[error("{operation}: deadline exceeded")]
    DeadlineExceeded { operation: &'static str },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    /// Create an SDK error, rendering the full error chain into the message.
    pub fn sdk(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Sdk {
            operation,
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
