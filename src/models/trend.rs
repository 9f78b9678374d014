//! Trend point model: one run's metrics within the historical series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::history::HistoryRecord;

/// Per-run metrics point in chronological trend data. Derived, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Run timestamp
    pub date: DateTime<Utc>,
    /// Total number of tests in the run
    pub total_tests: i32,
    /// Count of passed tests
    pub passed: i32,
    /// Count of failed tests
    pub failed: i32,
    /// Count of skipped tests
    pub skipped: i32,
    /// Run duration in milliseconds
    pub duration: i64,
    /// Share of flaky tests; 0.0 when the record carries none
    pub flakiness_rate: f64,
}

impl TrendPoint {
    /// Map an archived record to its metrics point.
    pub fn from_record(record: &HistoryRecord) -> Self {
        TrendPoint {
            date: record.run.timestamp,
            total_tests: record.run.total_tests,
            passed: record.run.passed,
            failed: record.run.failed,
            skipped: record.run.skipped,
            duration: record.run.duration,
            flakiness_rate: record.run.flakiness_rate.unwrap_or(0.0),
        }
    }
}
