//! AWS SDK implementations of the boundary traits
//!
//! The SDK is async; `AwsApi` owns a current-thread runtime and blocks on each
//! request, racing it against the call context's cancellation and deadline.

use std::future::Future;

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_codebuild::error::DisplayErrorContext;
use aws_sdk_codebuild::operation::retry_build::RetryBuildOutput;
use aws_sdk_codebuild::types::{Build, SortOrderType};
use chrono::{DateTime, Utc};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::config::Settings;
use crate::domain::{BuildRecord, BuildStatus, LogEvent, LogReference};
use crate::infrastructure::traits::{BuildApi, LogApi, LogEventPage, ProjectPage};
use crate::infrastructure::{CallContext, InfraError, InfraResult};

/// CodeBuild and CloudWatch Logs clients sharing one SDK configuration.
pub struct AwsApi {
    runtime: Runtime,
    codebuild: aws_sdk_codebuild::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
}

impl AwsApi {
    /// Load the SDK configuration (credential chain, region) and create clients.
    ///
    /// The profile and region come from settings; SDK-level retries are
    /// disabled so every failure surfaces on the first attempt.
    pub fn connect(settings: &Settings) -> InfraResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| InfraError::io("start async runtime", e))?;

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).retry_config(RetryConfig::disabled());
        if let Some(profile) = &settings.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = runtime.block_on(loader.load());
        debug!(
            "connect: profile={:?} region={:?}",
            settings.profile,
            sdk_config.region()
        );

        Ok(Self {
            codebuild: aws_sdk_codebuild::Client::new(&sdk_config),
            logs: aws_sdk_cloudwatchlogs::Client::new(&sdk_config),
            runtime,
        })
    }

    /// Drive one SDK request to completion unless the context ends first.
    fn call<T, E, F>(&self, ctx: &CallContext, operation: &'static str, request: F) -> InfraResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        ctx.check(operation)?;
        self.runtime.block_on(race(ctx, operation, request))
    }
}

/// Await `request`, failing as soon as `ctx` is cancelled or its deadline passes.
async fn race<T, E, F>(ctx: &CallContext, operation: &'static str, request: F) -> InfraResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: std::error::Error,
{
    let expiry = async {
        match ctx.deadline() {
            Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        result = request => result.map_err(|e| {
            InfraError::sdk(operation, DisplayErrorContext(&e).to_string())
        }),
        _ = ctx.token().cancelled() => Err(InfraError::Cancelled { operation }),
        _ = expiry => Err(InfraError::DeadlineExceeded { operation }),
    }
}

fn to_utc(secs: i64, nanos: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, nanos)
}

fn to_build_record(build: Build) -> BuildRecord {
    let status = build
        .build_status
        .as_ref()
        .map(|s| BuildStatus::from_code(s.as_str()))
        .unwrap_or(BuildStatus::Unknown);
    BuildRecord {
        id: build.id.unwrap_or_default(),
        status,
        start_time: build
            .start_time
            .and_then(|t| to_utc(t.secs(), t.subsec_nanos())),
        logs: build.logs.map(|l| LogReference {
            group_name: l.group_name,
            stream_name: l.stream_name,
        }),
    }
}

fn retried_build_id(output: RetryBuildOutput) -> Option<String> {
    output.build_value.and_then(|b| b.id)
}

impl BuildApi for AwsApi {
    fn list_projects(
        &self,
        ctx: &CallContext,
        next_token: Option<&str>,
    ) -> InfraResult<ProjectPage> {
        let request = self
            .codebuild
            .list_projects()
            .set_next_token(next_token.map(str::to_owned))
            .send();
        let output = self.call(ctx, "ListProjects", request)?;
        Ok(ProjectPage {
            projects: output.projects.unwrap_or_default(),
            next_token: output.next_token,
        })
    }

    fn list_build_ids_for_project(
        &self,
        ctx: &CallContext,
        project: &str,
    ) -> InfraResult<Vec<String>> {
        let request = self
            .codebuild
            .list_builds_for_project()
            .project_name(project)
            .sort_order(SortOrderType::Descending)
            .send();
        let output = self.call(ctx, "ListBuildsForProject", request)?;
        Ok(output.ids.unwrap_or_default())
    }

    fn batch_get_builds(
        &self,
        ctx: &CallContext,
        ids: &[String],
    ) -> InfraResult<Vec<BuildRecord>> {
        let request = self
            .codebuild
            .batch_get_builds()
            .set_ids(Some(ids.to_vec()))
            .send();
        let output = self.call(ctx, "BatchGetBuilds", request)?;
        Ok(output
            .builds
            .unwrap_or_default()
            .into_iter()
            .map(to_build_record)
            .collect())
    }

    fn retry_build(&self, ctx: &CallContext, build_id: &str) -> InfraResult<Option<String>> {
        let request = self.codebuild.retry_build().id(build_id).send();
        let output = self.call(ctx, "RetryBuild", request)?;
        Ok(retried_build_id(output))
    }
}

impl LogApi for AwsApi {
    fn get_log_events(
        &self,
        ctx: &CallContext,
        group: &str,
        stream: &str,
        next_token: Option<&str>,
        start_from_head: bool,
    ) -> InfraResult<LogEventPage> {
        let request = self
            .logs
            .get_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .set_next_token(next_token.map(str::to_owned))
            .start_from_head(start_from_head)
            .send();
        let output = self.call(ctx, "GetLogEvents", request)?;
        let events = output
            .events
            .unwrap_or_default()
            .into_iter()
            .map(|e| LogEvent {
                timestamp: e.timestamp.and_then(DateTime::from_timestamp_millis),
                message: e.message.unwrap_or_default(),
            })
            .collect();
        Ok(LogEventPage {
            events,
            next_forward_token: output.next_forward_token,
        })
    }
}
