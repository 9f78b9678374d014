//! History record model: an immutable snapshot of one archived run.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::run::RunSummary;
use super::test_result::TestResult;

/// One run's summary and full result list, persisted as a single JSON file.
///
/// Records are written exactly once per report-generation invocation and
/// never mutated; the filename is derived from `run.timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryRecord {
    /// Run summary
    pub run: RunSummary,
    /// All test results of the run
    pub results: Vec<TestResult>,
}
