//! Tests for CloudService pagination and aggregation
//!
//! The AWS boundary traits are replaced with scripted fakes that hand out
//! pre-built pages and record every request they receive.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use cb::application::services::{BuildService, CloudService};
use cb::application::ApplicationError;
use cb::domain::{BuildRecord, BuildStatus, LogEvent, LogReference};
use cb::infrastructure::traits::{BuildApi, LogApi, LogEventPage, ProjectPage};
use cb::infrastructure::{CallContext, InfraError, InfraResult};
use cb::util::testing;

// ============================================================
// Fakes
// ============================================================

#[derive(Default)]
struct FakeBuildApi {
    project_pages: Mutex<VecDeque<InfraResult<ProjectPage>>>,
    build_ids: Mutex<Vec<String>>,
    builds: Mutex<Vec<BuildRecord>>,
    retried: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBuildApi {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl BuildApi for FakeBuildApi {
    fn list_projects(
        &self,
        _ctx: &CallContext,
        next_token: Option<&str>,
    ) -> InfraResult<ProjectPage> {
        self.record(format!("ListProjects({})", next_token.unwrap_or("-")));
        self.project_pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected ListProjects call")
    }

    fn list_build_ids_for_project(
        &self,
        _ctx: &CallContext,
        project: &str,
    ) -> InfraResult<Vec<String>> {
        self.record(format!("ListBuildsForProject({project})"));
        Ok(self.build_ids.lock().unwrap().clone())
    }

    fn batch_get_builds(
        &self,
        _ctx: &CallContext,
        ids: &[String],
    ) -> InfraResult<Vec<BuildRecord>> {
        self.record(format!("BatchGetBuilds({})", ids.join(",")));
        Ok(self.builds.lock().unwrap().clone())
    }

    fn retry_build(&self, _ctx: &CallContext, build_id: &str) -> InfraResult<Option<String>> {
        self.record(format!("RetryBuild({build_id})"));
        Ok(self.retried.lock().unwrap().clone())
    }
}

#[derive(Default)]
struct FakeLogApi {
    pages: Mutex<VecDeque<InfraResult<LogEventPage>>>,
    tokens_seen: Mutex<Vec<Option<String>>>,
}

impl FakeLogApi {
    fn with_pages(pages: Vec<InfraResult<LogEventPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    fn tokens_seen(&self) -> Vec<Option<String>> {
        self.tokens_seen.lock().unwrap().clone()
    }
}

impl LogApi for FakeLogApi {
    fn get_log_events(
        &self,
        _ctx: &CallContext,
        group: &str,
        stream: &str,
        next_token: Option<&str>,
        start_from_head: bool,
    ) -> InfraResult<LogEventPage> {
        assert_eq!(group, "/aws/codebuild/app");
        assert_eq!(stream, "stream-1");
        assert!(start_from_head, "logs must be read from the head");
        self.tokens_seen
            .lock()
            .unwrap()
            .push(next_token.map(str::to_owned));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .expect("log stream drained past its end")
    }
}

fn project_page(projects: &[&str], next_token: Option<&str>) -> InfraResult<ProjectPage> {
    Ok(ProjectPage {
        projects: projects.iter().map(|p| p.to_string()).collect(),
        next_token: next_token.map(str::to_owned),
    })
}

fn log_page(messages: &[&str], next_forward_token: Option<&str>) -> InfraResult<LogEventPage> {
    Ok(LogEventPage {
        events: messages.iter().map(|m| LogEvent::new(*m)).collect(),
        next_forward_token: next_forward_token.map(str::to_owned),
    })
}

fn build_with_logs(group: Option<&str>, stream: Option<&str>) -> BuildRecord {
    BuildRecord::new("app:1", BuildStatus::Succeeded).with_logs(LogReference {
        group_name: group.map(str::to_owned),
        stream_name: stream.map(str::to_owned),
    })
}

fn service(builds: &Arc<FakeBuildApi>, logs: &Arc<FakeLogApi>) -> CloudService {
    testing::init_test_setup();
    CloudService::new(builds.clone(), logs.clone())
}

// ============================================================
// list_projects()
// ============================================================

#[test]
fn given_three_pages_when_listing_projects_then_accumulates_in_api_order() {
    // Arrange
    let builds = Arc::new(FakeBuildApi::default());
    *builds.project_pages.lock().unwrap() = VecDeque::from(vec![
        project_page(&["zeta", "alpha"], Some("t1")),
        project_page(&["mid"], Some("t2")),
        project_page(&["last"], Some("")),
    ]);
    let logs = Arc::new(FakeLogApi::default());
    let svc = service(&builds, &logs);

    // Act
    let projects = svc.list_projects(&CallContext::background()).unwrap();

    // Assert
    assert_eq!(projects, vec!["zeta", "alpha", "mid", "last"]);
    assert_eq!(
        builds.calls(),
        vec!["ListProjects(-)", "ListProjects(t1)", "ListProjects(t2)"]
    );
}

#[test]
fn given_absent_token_when_listing_projects_then_stops_after_first_page() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.project_pages.lock().unwrap() =
        VecDeque::from(vec![project_page(&["only"], None)]);
    let logs = Arc::new(FakeLogApi::default());

    let projects = service(&builds, &logs)
        .list_projects(&CallContext::background())
        .unwrap();

    assert_eq!(projects, vec!["only"]);
    assert_eq!(builds.calls().len(), 1);
}

#[test]
fn given_failure_on_second_page_when_listing_projects_then_returns_error_not_partial() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.project_pages.lock().unwrap() = VecDeque::from(vec![
        project_page(&["a"], Some("t1")),
        Err(InfraError::sdk("ListProjects", "throttled")),
    ]);
    let logs = Arc::new(FakeLogApi::default());

    let result = service(&builds, &logs).list_projects(&CallContext::background());

    let err = result.unwrap_err();
    assert!(matches!(err, ApplicationError::Remote(_)));
    assert_eq!(err.to_string(), "ListProjects: throttled");
}

// ============================================================
// list_project_builds()
// ============================================================

#[test]
fn given_project_without_builds_when_listing_then_empty_and_no_batch_call() {
    let builds = Arc::new(FakeBuildApi::default());
    let logs = Arc::new(FakeLogApi::default());

    let lines = service(&builds, &logs)
        .list_project_builds(&CallContext::background(), "empty")
        .unwrap();

    assert!(lines.is_empty());
    assert_eq!(
        builds.calls(),
        vec!["ListBuildsForProject(empty)"]
    );
}

#[test]
fn given_builds_when_listing_then_renders_status_and_optional_start_time() {
    // Arrange
    let builds = Arc::new(FakeBuildApi::default());
    *builds.build_ids.lock().unwrap() = vec!["app:2".into(), "app:1".into()];
    *builds.builds.lock().unwrap() = vec![
        BuildRecord::new("app:2", BuildStatus::InProgress),
        BuildRecord::new("app:1", BuildStatus::Failed)
            .with_start_time(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
    ];
    let logs = Arc::new(FakeLogApi::default());

    // Act
    let lines = service(&builds, &logs)
        .list_project_builds(&CallContext::background(), "app")
        .unwrap();

    // Assert
    assert_eq!(
        lines,
        vec!["app:2  IN_PROGRESS", "app:1  FAILED  2024-01-02 03:04:05Z"]
    );
    assert_eq!(
        builds.calls(),
        vec![
            "ListBuildsForProject(app)",
            "BatchGetBuilds(app:2,app:1)"
        ]
    );
}

#[test]
fn given_batch_response_out_of_order_when_listing_then_sorted_newest_first() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.build_ids.lock().unwrap() = vec!["app:3".into(), "app:2".into(), "app:1".into()];
    *builds.builds.lock().unwrap() = vec![
        BuildRecord::new("app:1", BuildStatus::Succeeded)
            .with_start_time(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()),
        BuildRecord::new("app:3", BuildStatus::Succeeded)
            .with_start_time(Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap()),
        BuildRecord::new("app:2", BuildStatus::Stopped)
            .with_start_time(Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap()),
    ];
    let logs = Arc::new(FakeLogApi::default());

    let lines = service(&builds, &logs)
        .list_project_builds(&CallContext::background(), "app")
        .unwrap();

    let ids: Vec<&str> = lines
        .iter()
        .map(|l| l.split("  ").next().unwrap())
        .collect();
    assert_eq!(ids, vec!["app:3", "app:2", "app:1"]);
}

// ============================================================
// get_build_log()
// ============================================================

#[test]
fn given_token_repeats_when_draining_log_then_stops_even_if_token_non_empty() {
    // Arrange: CloudWatch returns the same forward token once the stream is exhausted
    let builds = Arc::new(FakeBuildApi::default());
    *builds.builds.lock().unwrap() =
        vec![build_with_logs(Some("/aws/codebuild/app"), Some("stream-1"))];
    let logs = Arc::new(FakeLogApi::with_pages(vec![
        log_page(&["one", "two"], Some("f/1")),
        log_page(&["three"], Some("f/2")),
        log_page(&[], Some("f/2")),
    ]));

    // Act
    let text = service(&builds, &logs)
        .get_build_log(&CallContext::background(), "app:1")
        .unwrap();

    // Assert
    assert_eq!(text, "one\ntwo\nthree\n");
    assert_eq!(
        logs.tokens_seen(),
        vec![None, Some("f/1".to_string()), Some("f/2".to_string())]
    );
}

#[test]
fn given_absent_forward_token_when_draining_log_then_stops() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.builds.lock().unwrap() =
        vec![build_with_logs(Some("/aws/codebuild/app"), Some("stream-1"))];
    let logs = Arc::new(FakeLogApi::with_pages(vec![
        log_page(&["a"], Some("f/1")),
        log_page(&["b"], None),
    ]));

    let text = service(&builds, &logs)
        .get_build_log(&CallContext::background(), "app:1")
        .unwrap();

    assert_eq!(text, "a\nb\n");
    assert_eq!(logs.tokens_seen().len(), 2);
}

#[test]
fn given_messages_with_and_without_newlines_when_draining_then_each_ends_in_one_newline() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.builds.lock().unwrap() =
        vec![build_with_logs(Some("/aws/codebuild/app"), Some("stream-1"))];
    let logs = Arc::new(FakeLogApi::with_pages(vec![log_page(
        &["[Container] start\n", "building", "done\n"],
        Some(""),
    )]));

    let text = service(&builds, &logs)
        .get_build_log(&CallContext::background(), "app:1")
        .unwrap();

    assert_eq!(text, "[Container] start\nbuilding\ndone\n");
}

#[test]
fn given_log_page_failure_when_draining_then_error_discards_partial_text() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.builds.lock().unwrap() =
        vec![build_with_logs(Some("/aws/codebuild/app"), Some("stream-1"))];
    let logs = Arc::new(FakeLogApi::with_pages(vec![
        log_page(&["partial"], Some("f/1")),
        Err(InfraError::sdk("GetLogEvents", "ResourceNotFoundException")),
    ]));

    let result = service(&builds, &logs).get_build_log(&CallContext::background(), "app:1");

    assert!(matches!(result, Err(ApplicationError::Remote(_))));
}

#[test]
fn given_unknown_build_when_getting_log_then_no_logs_error() {
    let builds = Arc::new(FakeBuildApi::default());
    let logs = Arc::new(FakeLogApi::default());

    let err = service(&builds, &logs)
        .get_build_log(&CallContext::background(), "ghost:1")
        .unwrap_err();

    assert!(matches!(err, ApplicationError::NoLogs(ref id) if id == "ghost:1"));
    assert_eq!(err.to_string(), "no logs for ghost:1");
    assert!(logs.tokens_seen().is_empty());
}

#[test]
fn given_build_without_log_reference_when_getting_log_then_no_logs_error() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.builds.lock().unwrap() = vec![BuildRecord::new("app:1", BuildStatus::InProgress)];
    let logs = Arc::new(FakeLogApi::default());

    let err = service(&builds, &logs)
        .get_build_log(&CallContext::background(), "app:1")
        .unwrap_err();

    assert!(matches!(err, ApplicationError::NoLogs(_)));
}

#[test]
fn given_log_reference_without_stream_when_getting_log_then_missing_stream_error() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.builds.lock().unwrap() = vec![build_with_logs(Some("/aws/codebuild/app"), None)];
    let logs = Arc::new(FakeLogApi::default());

    let err = service(&builds, &logs)
        .get_build_log(&CallContext::background(), "app:1")
        .unwrap_err();

    assert!(matches!(err, ApplicationError::MissingLogStream(_)));
    assert_eq!(err.to_string(), "missing log stream for app:1");
    assert!(logs.tokens_seen().is_empty());
}

// ============================================================
// rerun_build()
// ============================================================

#[test]
fn given_retry_response_when_rerunning_then_returns_new_id_verbatim() {
    let builds = Arc::new(FakeBuildApi::default());
    *builds.retried.lock().unwrap() = Some("app:7f3e".into());
    let logs = Arc::new(FakeLogApi::default());

    let new_id = service(&builds, &logs)
        .rerun_build(&CallContext::background(), "app:1")
        .unwrap();

    assert_eq!(new_id, "app:7f3e");
    assert_eq!(builds.calls(), vec!["RetryBuild(app:1)"]);
}

#[test]
fn given_retry_response_without_build_when_rerunning_then_error() {
    let builds = Arc::new(FakeBuildApi::default());
    let logs = Arc::new(FakeLogApi::default());

    let err = service(&builds, &logs)
        .rerun_build(&CallContext::background(), "app:1")
        .unwrap_err();

    assert!(matches!(err, ApplicationError::NoRetriedBuild(_)));
}

// ============================================================
// cancellation
// ============================================================

#[test]
fn given_cancelled_context_when_calling_any_operation_then_fails_before_remote_call() {
    let builds = Arc::new(FakeBuildApi::default());
    let logs = Arc::new(FakeLogApi::default());
    let svc = service(&builds, &logs);
    let ctx = CallContext::background();
    ctx.token().cancel();

    assert!(svc.list_projects(&ctx).is_err());
    assert!(svc.list_project_builds(&ctx, "app").is_err());
    assert!(svc.get_build_log(&ctx, "app:1").is_err());
    let err = svc.rerun_build(&ctx, "app:1").unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Remote(InfraError::Cancelled { .. })
    ));
    assert!(builds.calls().is_empty());
    assert!(logs.tokens_seen().is_empty());
}
