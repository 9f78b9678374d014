//! Run summary model describing one execution of an automated test suite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Summary of a single test run, created once by the external test runner.
///
/// Immutable after creation; the report pipeline never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Run ID
    pub id: Uuid,
    /// Run start time; doubles as the history record key
    pub timestamp: DateTime<Utc>,
    /// Total number of tests in the run
    pub total_tests: i32,
    /// Count of passed tests
    pub passed: i32,
    /// Count of failed tests
    pub failed: i32,
    /// Count of skipped tests
    pub skipped: i32,
    /// Count of timed-out tests
    pub timed_out: i32,
    /// Count of pending tests
    pub pending: i32,
    /// Total wall-clock duration in milliseconds
    pub duration: i64,
    /// Share of flaky tests in the run, if the runner reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flakiness_rate: Option<f64>,
    /// Free-form nested environment description (OS, CI, browser versions, ...)
    #[serde(default)]
    #[schema(value_type = Object)]
    pub environment: serde_json::Value,
}
