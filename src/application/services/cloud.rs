//! AWS-backed build service
//!
//! Aggregates paginated CodeBuild and CloudWatch Logs responses into the
//! shapes the CLI prints. Every loop is sequential and fails atomically:
//! an error from any page discards what was accumulated so far.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::BuildService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{append_log_line, sort_newest_first, LogDestination};
use crate::infrastructure::traits::{BuildApi, LogApi, MAX_BATCH_GET_BUILDS};
use crate::infrastructure::CallContext;

/// Service talking to CodeBuild and CloudWatch Logs through boundary traits.
pub struct CloudService {
    builds: Arc<dyn BuildApi>,
    logs: Arc<dyn LogApi>,
}

impl CloudService {
    pub fn new(builds: Arc<dyn BuildApi>, logs: Arc<dyn LogApi>) -> Self {
        Self { builds, logs }
    }

    /// Look up where a build writes its log.
    fn resolve_log_destination(
        &self,
        ctx: &CallContext,
        build_id: &str,
    ) -> ApplicationResult<LogDestination> {
        ctx.check("BatchGetBuilds")?;
        let builds = self.builds.batch_get_builds(ctx, &[build_id.to_string()])?;
        let reference = builds
            .into_iter()
            .next()
            .and_then(|b| b.logs)
            .ok_or_else(|| ApplicationError::NoLogs(build_id.to_string()))?;
        reference
            .resolve()
            .ok_or_else(|| ApplicationError::MissingLogStream(build_id.to_string()))
    }

    /// Read a log stream from the head until the forward token stops moving.
    ///
    /// CloudWatch Logs never omits `nextForwardToken`; at the end of a stream it
    /// returns the token it was given. Stop on either an absent/empty token or
    /// an unchanged one.
    fn drain_log_stream(
        &self,
        ctx: &CallContext,
        destination: &LogDestination,
    ) -> ApplicationResult<String> {
        let mut text = String::new();
        let mut next: Option<String> = None;
        let mut pages = 0usize;

        loop {
            ctx.check("GetLogEvents")?;
            let page = self.logs.get_log_events(
                ctx,
                &destination.group,
                &destination.stream,
                next.as_deref(),
                true,
            )?;
            pages += 1;
            debug!(
                "drain_log_stream: page {} with {} events, last at {:?}",
                pages,
                page.events.len(),
                page.events.last().and_then(|e| e.timestamp)
            );

            for event in &page.events {
                append_log_line(&mut text, &event.message);
            }

            match page.next_forward_token {
                Some(token) if !token.is_empty() && next.as_deref() != Some(token.as_str()) => {
                    next = Some(token);
                }
                _ => break,
            }
        }

        Ok(text)
    }
}

impl BuildService for CloudService {
    fn list_projects(&self, ctx: &CallContext) -> ApplicationResult<Vec<String>> {
        let mut projects = Vec::new();
        let mut next: Option<String> = None;

        loop {
            ctx.check("ListProjects")?;
            let page = self.builds.list_projects(ctx, next.as_deref())?;
            debug!("list_projects: page with {} projects", page.projects.len());
            projects.extend(page.projects);

            match page.next_token {
                Some(token) if !token.is_empty() => next = Some(token),
                _ => break,
            }
        }

        Ok(projects)
    }

    fn list_project_builds(
        &self,
        ctx: &CallContext,
        project: &str,
    ) -> ApplicationResult<Vec<String>> {
        ctx.check("ListBuildsForProject")?;
        let mut ids = self.builds.list_build_ids_for_project(ctx, project)?;
        debug!("list_project_builds: project={} ids={}", project, ids.len());
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ids.truncate(MAX_BATCH_GET_BUILDS);

        ctx.check("BatchGetBuilds")?;
        let mut builds = self.builds.batch_get_builds(ctx, &ids)?;
        // BatchGetBuilds does not promise to keep request order
        sort_newest_first(&mut builds);

        Ok(builds.iter().map(|b| b.display_line()).collect())
    }

    fn get_build_log(&self, ctx: &CallContext, build_id: &str) -> ApplicationResult<String> {
        let destination = self.resolve_log_destination(ctx, build_id)?;
        debug!(
            "get_build_log: build={} group={} stream={}",
            build_id, destination.group, destination.stream
        );
        self.drain_log_stream(ctx, &destination)
    }

    fn rerun_build(&self, ctx: &CallContext, build_id: &str) -> ApplicationResult<String> {
        ctx.check("RetryBuild")?;
        let new_id = self
            .builds
            .retry_build(ctx, build_id)?
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApplicationError::NoRetriedBuild(build_id.to_string()))?;
        debug!("rerun_build: {} -> {}", build_id, new_id);
        Ok(new_id)
    }
}
