//! Application services
//!
//! `BuildService` is the four-operation contract the CLI talks to. Two
//! backends implement it: an offline stub and the AWS-backed cloud service,
//! which depends on I/O boundary traits (BuildApi, LogApi).

mod cloud;
mod stub;

pub use cloud::CloudService;
pub use stub::StubService;

use crate::application::ApplicationResult;
use crate::infrastructure::CallContext;

/// Access to build projects, builds and their logs.
pub trait BuildService: Send + Sync {
    /// All project names, in the order the backend returns them.
    fn list_projects(&self, ctx: &CallContext) -> ApplicationResult<Vec<String>>;

    /// One display line per build of `project`, newest first.
    /// A project without builds yields an empty vector.
    fn list_project_builds(&self, ctx: &CallContext, project: &str)
        -> ApplicationResult<Vec<String>>;

    /// Complete log text of a build.
    fn get_build_log(&self, ctx: &CallContext, build_id: &str) -> ApplicationResult<String>;

    /// Start a new build from an existing one and return the new build id.
    ///
    /// Backends without rerun support return `ApplicationError::NotImplemented`.
    fn rerun_build(&self, ctx: &CallContext, build_id: &str) -> ApplicationResult<String>;
}
