//! Test result model representing individual test execution results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

/// Worker id marking tests never assigned to a concurrent execution slot
/// (skipped tests, tests short-circuited before scheduling).
pub const NO_WORKER_SLOT: i64 = -1;

/// Test execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    #[serde(rename = "timedOut")]
    TimedOut,
    Pending,
}

impl TestStatus {
    /// String representation as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::TimedOut => "timedOut",
            Self::Pending => "pending",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Self {
        match s {
            "passed" => Self::Passed,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            "timedOut" => Self::TimedOut,
            "pending" => Self::Pending,
            _ => {
                warn!("Unknown test status: {}, treating as failed", s);
                Self::Failed
            }
        }
    }

    /// Whether this status counts as a failure (failed or timed out).
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::TimedOut)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named attachment produced by a test (trace viewer export, log dump, ...).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    /// Display name
    pub name: String,
    /// Content type supplied by the test runner
    pub content_type: String,
    /// Path relative to the report output root
    pub path: String,
}

/// One node of a test's step tree.
///
/// Children are owned exclusively by their parent, so the tree is acyclic by
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    /// Step ID
    pub id: String,
    /// Step title
    pub title: String,
    /// Step status
    pub status: TestStatus,
    /// Step duration in milliseconds
    pub duration: i64,
    /// Nested child steps
    #[serde(default)]
    #[schema(no_recursion)]
    pub steps: Vec<TestStep>,
    /// Error message, if the step failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Source location ("file:line:column") the step originates from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_location: Option<String>,
    /// Whether this step is a fixture hook rather than test body
    #[serde(default)]
    pub is_hook: bool,
    /// Hook type ("before", "after", ...) when `is_hook` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_type: Option<String>,
}

impl TestStep {
    /// Total number of nodes in this subtree, including self.
    pub fn subtree_len(&self) -> usize {
        1 + self.steps.iter().map(TestStep::subtree_len).sum::<usize>()
    }
}

/// Individual test execution result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Test ID, stable across runs for the same logical test
    pub id: String,
    /// Hierarchical test name, segments joined with " > "
    pub name: String,
    /// Explicit suite name; may be empty for older runner versions
    #[serde(default)]
    pub suite_name: String,
    /// Execution status
    pub status: TestStatus,
    /// Execution duration in milliseconds
    pub duration: i64,
    /// Execution start time
    pub start_time: DateTime<Utc>,
    /// Execution end time
    pub end_time: DateTime<Utc>,
    /// Browser/project the test ran under
    #[serde(default)]
    pub browser: String,
    /// Execution slot, or [`NO_WORKER_SLOT`] when never scheduled
    #[serde(default = "default_worker_id")]
    pub worker_id: i64,
    /// Retry attempts before the final result (0 = first attempt passed/failed)
    #[serde(default)]
    pub retries: i32,
    /// Step tree of the final attempt
    #[serde(default)]
    pub steps: Vec<TestStep>,
    /// Error message of the final attempt, possibly containing SGR escapes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Captured stdout lines, possibly containing SGR escapes
    #[serde(default)]
    pub stdout: Vec<String>,
    /// Screenshot paths relative to the report output root
    #[serde(default)]
    pub screenshots: Vec<String>,
    /// Video paths relative to the report output root
    #[serde(default)]
    pub video_paths: Vec<String>,
    /// Trace archive path relative to the report output root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_path: Option<String>,
    /// Additional named attachments
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    /// Tags assigned by the test author
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_worker_id() -> i64 {
    NO_WORKER_SLOT
}

impl TestResult {
    /// Whether the test was assigned a concurrent execution slot.
    pub fn has_worker_slot(&self) -> bool {
        self.worker_id != NO_WORKER_SLOT
    }

    /// Suite name, falling back to the first segment of the hierarchical
    /// name when the explicit field is empty.
    ///
    /// The live dashboard always uses the explicit field; this heuristic is
    /// only for the offline report, where older run files may predate
    /// `suiteName`.
    pub fn suite_or_derived(&self) -> &str {
        if !self.suite_name.is_empty() {
            return &self.suite_name;
        }
        self.name.split(" > ").next().unwrap_or(&self.name)
    }
}
