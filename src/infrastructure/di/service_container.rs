//! Service container for dependency injection
//!
//! Wires up the configured backend behind the `BuildService` trait.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::application::services::{BuildService, CloudService, StubService};
use crate::config::{Backend, Settings};
use crate::infrastructure::aws::AwsApi;
use crate::infrastructure::{CallContext, InfraResult};

/// Container holding the selected backend and the settings it was built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Backend selected by `settings.backend`
    pub service: Box<dyn BuildService>,
}

impl ServiceContainer {
    /// Create a container with the backend named in settings.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        info!("backend: {}", settings.backend);
        let service: Box<dyn BuildService> = match settings.backend {
            Backend::Stub => Box::new(StubService::new()),
            Backend::Aws => {
                let api = Arc::new(AwsApi::connect(&settings)?);
                Box::new(CloudService::new(api.clone(), api))
            }
        };
        Ok(Self::with_service(settings, service))
    }

    /// Create a container around an existing service (for testing).
    pub fn with_service(settings: Settings, service: Box<dyn BuildService>) -> Self {
        Self {
            settings: Arc::new(settings),
            service,
        }
    }

    /// Fresh call context honouring the configured timeout.
    pub fn call_context(&self) -> CallContext {
        match self.settings.timeout_secs {
            Some(secs) => CallContext::with_timeout(Duration::from_secs(secs)),
            None => CallContext::background(),
        }
    }
}
