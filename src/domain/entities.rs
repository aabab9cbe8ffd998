//! Domain entities: build records, statuses and log locations

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};

/// Timestamp format used in build listing lines.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

/// Build status as reported by CodeBuild.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildStatus {
    Succeeded,
    Failed,
    Fault,
    TimedOut,
    InProgress,
    Stopped,
    /// Status missing from the API response
    Unknown,
    /// Status code this tool does not know about, kept verbatim
    Other(String),
}

impl BuildStatus {
    /// Map a CodeBuild status code (e.g. `SUCCEEDED`) to a status.
    pub fn from_code(code: &str) -> Self {
        match code {
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "FAULT" => Self::Fault,
            "TIMED_OUT" => Self::TimedOut,
            "IN_PROGRESS" => Self::InProgress,
            "STOPPED" => Self::Stopped,
            "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    /// The CodeBuild status code.
    pub fn as_code(&self) -> &str {
        match self {
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Fault => "FAULT",
            Self::TimedOut => "TIMED_OUT",
            Self::InProgress => "IN_PROGRESS",
            Self::Stopped => "STOPPED",
            Self::Unknown => "UNKNOWN",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Where a build writes its log, as reported by the build API.
///
/// Either half may be missing; use [`LogReference::resolve`] to get a usable
/// destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogReference {
    pub group_name: Option<String>,
    pub stream_name: Option<String>,
}

impl LogReference {
    /// Complete (group, stream) pair, or `None` if either name is missing.
    pub fn resolve(&self) -> Option<LogDestination> {
        match (&self.group_name, &self.stream_name) {
            (Some(group), Some(stream)) => Some(LogDestination {
                group: group.clone(),
                stream: stream.clone(),
            }),
            _ => None,
        }
    }
}

/// A fully resolved CloudWatch Logs location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDestination {
    pub group: String,
    pub stream: String,
}

/// One build of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    pub id: String,
    pub status: BuildStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub logs: Option<LogReference>,
}

impl BuildRecord {
    pub fn new(id: impl Into<String>, status: BuildStatus) -> Self {
        Self {
            id: id.into(),
            status,
            start_time: None,
            logs: None,
        }
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_logs(mut self, logs: LogReference) -> Self {
        self.logs = Some(logs);
        self
    }

    /// Listing line: `<id>  <STATUS>` plus `  <start time>` when known.
    pub fn display_line(&self) -> String {
        match self.start_time {
            Some(start) => format!(
                "{}  {}  {}",
                self.id,
                self.status,
                start.format(START_TIME_FORMAT)
            ),
            None => format!("{}  {}", self.id, self.status),
        }
    }
}

/// Order builds newest first by start time.
///
/// Builds without a start time have not started yet and sort ahead of all
/// others. The sort is stable, so ties keep the order the API returned.
pub fn sort_newest_first(builds: &mut [BuildRecord]) {
    builds.sort_by(|a, b| match (a.start_time, b.start_time) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    });
}

/// A single line from a log stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
}

impl LogEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            message: message.into(),
        }
    }
}

/// Append a log message to `text`, terminating it with a newline if it has none.
pub fn append_log_line(text: &mut String, message: &str) {
    text.push_str(message);
    if !message.ends_with('\n') {
        text.push('\n');
    }
}
