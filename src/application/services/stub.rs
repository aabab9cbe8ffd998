//! Offline backend with canned data
//!
//! Never touches the network. Used for local development and tests.

use chrono::{DateTime, Utc};

use crate::application::services::BuildService;
use crate::application::ApplicationResult;
use crate::infrastructure::CallContext;

const STAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Deterministic stand-in for the cloud backend.
pub struct StubService {
    clock: Clock,
}

impl Default for StubService {
    fn default() -> Self {
        Self::new()
    }
}

impl StubService {
    /// Stub stamped with the current UTC time.
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    /// Stub with an injected clock, so generated ids are reproducible.
    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    fn stamp(&self) -> String {
        (self.clock)().format(STAMP_FORMAT).to_string()
    }
}

impl BuildService for StubService {
    fn list_projects(&self, ctx: &CallContext) -> ApplicationResult<Vec<String>> {
        ctx.check("ListProjects")?;
        Ok(vec!["project-a".to_string(), "project-b".to_string()])
    }

    fn list_project_builds(
        &self,
        ctx: &CallContext,
        project: &str,
    ) -> ApplicationResult<Vec<String>> {
        ctx.check("ListBuildsForProject")?;
        let now = self.stamp();
        Ok(vec![
            format!("{}:{}:1", project, now),
            format!("{}:{}:2", project, now),
        ])
    }

    fn get_build_log(&self, ctx: &CallContext, build_id: &str) -> ApplicationResult<String> {
        ctx.check("GetLogEvents")?;
        Ok(format!(
            "[stub] build log for {}\nStep 1: ...\nStep 2: ...\nSuccess.",
            build_id
        ))
    }

    fn rerun_build(&self, ctx: &CallContext, build_id: &str) -> ApplicationResult<String> {
        ctx.check("RetryBuild")?;
        Ok(format!("{}/rerun-{}", build_id, self.stamp()))
    }
}
