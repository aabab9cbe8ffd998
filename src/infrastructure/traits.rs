//! I/O boundary traits for testability
//!
//! These traits abstract the remote CodeBuild and CloudWatch Logs APIs at the
//! granularity of a single request, allowing the aggregation logic in the
//! cloud service to be tested with scripted implementations.

use crate::domain::{BuildRecord, LogEvent};
use crate::infrastructure::{CallContext, InfraResult};

/// Maximum number of ids `BatchGetBuilds` accepts in one request.
pub const MAX_BATCH_GET_BUILDS: usize = 100;

/// One page of `ListProjects`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPage {
    pub projects: Vec<String>,
    /// Continuation token; `None` or empty means this was the last page
    pub next_token: Option<String>,
}

/// One page of `GetLogEvents`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEventPage {
    pub events: Vec<LogEvent>,
    pub next_forward_token: Option<String>,
}

/// Build management API (CodeBuild).
pub trait BuildApi: Send + Sync {
    /// Fetch one page of project names.
    fn list_projects(
        &self,
        ctx: &CallContext,
        next_token: Option<&str>,
    ) -> InfraResult<ProjectPage>;

    /// Fetch the first page of build ids for a project, newest first.
    fn list_build_ids_for_project(&self, ctx: &CallContext, project: &str)
        -> InfraResult<Vec<String>>;

    /// Fetch build details for at most [`MAX_BATCH_GET_BUILDS`] ids.
    fn batch_get_builds(&self, ctx: &CallContext, ids: &[String])
        -> InfraResult<Vec<BuildRecord>>;

    /// Start a new build with the settings of an existing one.
    /// Returns the id of the new build, if the response carried one.
    fn retry_build(&self, ctx: &CallContext, build_id: &str) -> InfraResult<Option<String>>;
}

/// Log retrieval API (CloudWatch Logs).
pub trait LogApi: Send + Sync {
    /// Fetch one page of events from a log stream.
    fn get_log_events(
        &self,
        ctx: &CallContext,
        group: &str,
        stream: &str,
        next_token: Option<&str>,
        start_from_head: bool,
    ) -> InfraResult<LogEventPage>;
}
