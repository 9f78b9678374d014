//! Flaky test models: per-test occurrence statistics across archived runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::test_result::TestStatus;

/// One observation of a test in one archived run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestOccurrence {
    /// Timestamp of the run the test appeared in
    pub run_timestamp: DateTime<Utc>,
    /// Status the test finished with in that run
    pub status: TestStatus,
}

/// Cross-run statistics for one logical test. Derived, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlakyTestDetail {
    /// Test ID, stable across runs
    pub id: String,
    /// Hierarchical test name
    pub name: String,
    /// Suite the test belongs to
    pub suite_name: String,
    /// All observations, sorted ascending by run timestamp
    pub occurrences: Vec<TestOccurrence>,
    /// Runs the test passed in
    pub passed_count: i32,
    /// Runs the test failed or timed out in
    pub failed_count: i32,
    /// Runs the test was skipped in
    pub skipped_count: i32,
    /// Runs the test was pending in
    pub pending_count: i32,
    /// Total runs the test appeared in
    pub total_runs: i32,
    /// Timestamp of the first observation
    pub first_seen: DateTime<Utc>,
    /// Timestamp of the last observation
    pub last_seen: DateTime<Utc>,
}

impl FlakyTestDetail {
    /// A test is flaky iff it was observed both passing and failing/timing
    /// out across the archived runs. A test seen in only one run can never
    /// satisfy both conditions.
    pub fn is_flaky(&self) -> bool {
        self.passed_count > 0 && self.failed_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn detail(passed: i32, failed: i32, total: i32) -> FlakyTestDetail {
        let ts = Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
        FlakyTestDetail {
            id: "t1".into(),
            name: "suite > test".into(),
            suite_name: "suite".into(),
            occurrences: Vec::new(),
            passed_count: passed,
            failed_count: failed,
            skipped_count: 0,
            pending_count: 0,
            total_runs: total,
            first_seen: ts,
            last_seen: ts,
        }
    }

    #[test]
    fn test_flaky_requires_both_pass_and_failure() {
        assert!(detail(3, 2, 5).is_flaky());
        assert!(!detail(5, 0, 5).is_flaky());
        assert!(!detail(0, 5, 5).is_flaky());
        // Single-run tests can only ever have one status.
        assert!(!detail(1, 0, 1).is_flaky());
    }
}
