//! Call context: cancellation and deadline for one CLI invocation
//!
//! Every service operation takes a `&CallContext`. Services check it before
//! each remote call, and the AWS adapter races in-flight requests against it.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::infrastructure::{InfraError, InfraResult};

#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Context without a deadline that is only cancelled explicitly.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now.
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Shared token; cancelling it cancels this context and every clone.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if the context is cancelled or past its deadline.
    pub fn check(&self, operation: &'static str) -> InfraResult<()> {
        if self.is_cancelled() {
            return Err(InfraError::Cancelled { operation });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(InfraError::DeadlineExceeded { operation });
        }
        Ok(())
    }
}
