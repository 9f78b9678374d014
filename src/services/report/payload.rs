//! Structured report payload: everything the offline document and the data
//! endpoint expose, derived once per generation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{FlakyTestDetail, RunSummary, TestResult, TestStatus, TestStep, TrendPoint};
use crate::services::attachments::EmbeddedAttachment;

/// Rationale shown next to the worker timeline for tests without a slot.
pub const UNASSIGNED_WORKERS_NOTE: &str = "Tests without an execution slot (worker -1), \
typically skipped tests, were never scheduled on a worker; they appear in the test listings \
but not on the timeline.";

/// One test prepared for rendering: markup converted, attachments inlined.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTest {
    /// Test ID, stable across runs
    pub id: String,
    /// Hierarchical test name
    pub name: String,
    /// Suite the test is grouped under in this report
    pub suite_name: String,
    /// Execution status
    pub status: TestStatus,
    /// Duration in milliseconds
    pub duration: i64,
    /// Execution start time
    pub start_time: DateTime<Utc>,
    /// Execution end time
    pub end_time: DateTime<Utc>,
    /// Browser/project the test ran under
    pub browser: String,
    /// Execution slot, -1 when never scheduled
    pub worker_id: i64,
    /// Retry attempts before the final result
    pub retries: i32,
    /// Step tree of the final attempt
    pub steps: Vec<TestStep>,
    /// Error message converted to HTML spans; already sanitized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_html: Option<String>,
    /// Stdout lines converted to HTML spans; already sanitized
    pub stdout_html: Vec<String>,
    /// Inlined screenshots
    pub screenshots: Vec<EmbeddedAttachment>,
    /// Inlined videos
    pub videos: Vec<EmbeddedAttachment>,
    /// Inlined trace archive, if one was recorded and readable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<EmbeddedAttachment>,
    /// Other inlined attachments
    pub attachments: Vec<EmbeddedAttachment>,
    /// Tags assigned by the test author
    pub tags: Vec<String>,
}

/// Suite-level rollup for the offline report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuiteGroup {
    /// Suite name (explicit field, or first segment of the test name)
    pub name: String,
    /// Tests in the suite
    pub total: i32,
    /// Passed tests
    pub passed: i32,
    /// Failed or timed-out tests
    pub failed: i32,
    /// Skipped or pending tests
    pub skipped: i32,
    /// Summed duration in milliseconds
    pub duration: i64,
    /// IDs of the member tests, in input order
    pub test_ids: Vec<String>,
}

/// One test's span on a worker's timeline.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSpan {
    /// Test ID
    pub test_id: String,
    /// Test name
    pub name: String,
    /// Final status
    pub status: TestStatus,
    /// Span start
    pub start_time: DateTime<Utc>,
    /// Span end, reconstructed as start + duration
    pub end_time: DateTime<Utc>,
}

/// Chronological timeline of one worker.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerLane {
    /// Execution slot id
    pub worker_id: i64,
    /// Spans sorted by start time
    pub spans: Vec<WorkerSpan>,
}

/// Per-worker utilization view data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkerUtilization {
    /// Lanes sorted by worker id
    pub lanes: Vec<WorkerLane>,
    /// IDs of tests excluded from the timeline (sentinel worker id)
    pub unassigned: Vec<String>,
    /// Rationale presented to the viewer for the exclusion
    pub note: String,
}

/// The complete exportable payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    /// Current-run summary
    pub run: RunSummary,
    /// All tests of the current run, prepared for rendering
    pub results: Vec<RenderedTest>,
    /// Historical metrics series, oldest first
    pub trend: Vec<TrendPoint>,
    /// Flaky tests ranked most unstable first
    pub flaky_tests: Vec<FlakyTestDetail>,
    /// Suite rollups for the current run
    pub suites: Vec<SuiteGroup>,
    /// Worker utilization view data
    pub workers: WorkerUtilization,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

/// Group tests into suites, preserving first-appearance order.
///
/// Falls back to splitting the hierarchical name when the explicit suite
/// field is empty; the live dashboard only ever uses the explicit field.
pub fn group_suites(results: &[TestResult]) -> Vec<SuiteGroup> {
    let mut groups: Vec<SuiteGroup> = Vec::new();

    for result in results {
        let name = result.suite_or_derived();
        let group = match groups.iter_mut().find(|g| g.name == name) {
            Some(group) => group,
            None => {
                groups.push(SuiteGroup {
                    name: name.to_string(),
                    total: 0,
                    passed: 0,
                    failed: 0,
                    skipped: 0,
                    duration: 0,
                    test_ids: Vec::new(),
                });
                groups.last_mut().expect("just pushed")
            }
        };

        group.total += 1;
        group.duration += result.duration;
        group.test_ids.push(result.id.clone());
        match result.status {
            TestStatus::Passed => group.passed += 1,
            TestStatus::Failed | TestStatus::TimedOut => group.failed += 1,
            TestStatus::Skipped | TestStatus::Pending => group.skipped += 1,
        }
    }

    groups
}

/// Reconstruct the per-worker chronological timeline.
///
/// Tests carrying the sentinel worker id never occupied a slot; they are
/// kept out of the lanes but listed so the viewer can account for them.
pub fn worker_utilization(results: &[TestResult]) -> WorkerUtilization {
    let mut lanes: Vec<WorkerLane> = Vec::new();
    let mut unassigned = Vec::new();

    for result in results {
        if !result.has_worker_slot() {
            unassigned.push(result.id.clone());
            continue;
        }

        let span = WorkerSpan {
            test_id: result.id.clone(),
            name: result.name.clone(),
            status: result.status,
            start_time: result.start_time,
            end_time: result.start_time + Duration::milliseconds(result.duration),
        };

        match lanes.iter_mut().find(|lane| lane.worker_id == result.worker_id) {
            Some(lane) => lane.spans.push(span),
            None => lanes.push(WorkerLane {
                worker_id: result.worker_id,
                spans: vec![span],
            }),
        }
    }

    lanes.sort_by_key(|lane| lane.worker_id);
    for lane in &mut lanes {
        lane.spans.sort_by_key(|span| span.start_time);
    }

    WorkerUtilization {
        lanes,
        unassigned,
        note: UNASSIGNED_WORKERS_NOTE.to_string(),
    }
}
