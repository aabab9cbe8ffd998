//! CLI-level errors (wraps application and infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Usage errors never get here: clap reports them before dispatch.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Application(_) | CliError::Infra(_) | CliError::Io(_) => {
                crate::exitcode::FAILURE
            }
        }
    }

    /// True when a backend reported the operation as unsupported.
    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            CliError::Application(ApplicationError::NotImplemented { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let remote = CliError::from(ApplicationError::from(InfraError::sdk(
            "ListProjects",
            "access denied",
        )));
        assert_eq!(remote.exit_code(), crate::exitcode::FAILURE);
        assert_eq!(remote.to_string(), "ListProjects: access denied");
        assert!(!remote.is_not_implemented());

        let unsupported = CliError::from(ApplicationError::NotImplemented {
            operation: "rerun",
            backend: "stub",
        });
        assert_eq!(unsupported.exit_code(), crate::exitcode::FAILURE);
        assert!(unsupported.is_not_implemented());
    }
}
