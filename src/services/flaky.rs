//! Flaky-test detection over the archived run history.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{FlakyTestDetail, HistoryRecord, TestOccurrence, TestStatus};

/// Groups test occurrences by stable test id across every archived run and
/// ranks the tests observed both passing and failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlakyTestDetector;

impl FlakyTestDetector {
    pub fn new() -> Self {
        FlakyTestDetector
    }

    /// Analyze the history and return the flaky tests, most unstable first.
    ///
    /// Ranking: descending failure ratio (failedCount / totalRuns), ties
    /// broken by totalRuns descending.
    pub fn analyze(&self, records: &[HistoryRecord]) -> Vec<FlakyTestDetail> {
        let mut details = collect_details(records);
        details.retain(FlakyTestDetail::is_flaky);
        details.sort_by(compare_rank);
        details
    }
}

/// Per-test occurrence statistics for every test id in the history.
fn collect_details(records: &[HistoryRecord]) -> Vec<FlakyTestDetail> {
    struct Accumulated {
        name: String,
        suite_name: String,
        occurrences: Vec<TestOccurrence>,
    }

    let mut by_id: HashMap<String, Accumulated> = HashMap::new();
    // Preserve first-seen ordering so output is stable across runs.
    let mut order: Vec<String> = Vec::new();

    for record in records {
        for result in &record.results {
            let entry = by_id.entry(result.id.clone()).or_insert_with(|| {
                order.push(result.id.clone());
                Accumulated {
                    name: result.name.clone(),
                    suite_name: result.suite_or_derived().to_string(),
                    occurrences: Vec::new(),
                }
            });
            // The latest run's naming wins if a test was renamed in place.
            entry.name = result.name.clone();
            entry.suite_name = result.suite_or_derived().to_string();
            entry.occurrences.push(TestOccurrence {
                run_timestamp: record.run.timestamp,
                status: result.status,
            });
        }
    }

    order
        .into_iter()
        .map(|id| {
            let mut acc = by_id.remove(&id).expect("id recorded on insert");
            acc.occurrences.sort_by_key(|occurrence| occurrence.run_timestamp);

            let passed_count = acc
                .occurrences
                .iter()
                .filter(|o| o.status == TestStatus::Passed)
                .count() as i32;
            let failed_count = acc
                .occurrences
                .iter()
                .filter(|o| o.status.is_failure())
                .count() as i32;
            let skipped_count = acc
                .occurrences
                .iter()
                .filter(|o| o.status == TestStatus::Skipped)
                .count() as i32;
            let pending_count = acc
                .occurrences
                .iter()
                .filter(|o| o.status == TestStatus::Pending)
                .count() as i32;

            let first_seen = acc.occurrences.first().expect("at least one occurrence").run_timestamp;
            let last_seen = acc.occurrences.last().expect("at least one occurrence").run_timestamp;

            FlakyTestDetail {
                id,
                name: acc.name,
                suite_name: acc.suite_name,
                total_runs: acc.occurrences.len() as i32,
                occurrences: acc.occurrences,
                passed_count,
                failed_count,
                skipped_count,
                pending_count,
                first_seen,
                last_seen,
            }
        })
        .collect()
}

/// Failure-ratio ordering without float comparison:
/// a.failed/a.total > b.failed/b.total iff a.failed*b.total > b.failed*a.total.
fn compare_rank(a: &FlakyTestDetail, b: &FlakyTestDetail) -> Ordering {
    let lhs = i64::from(b.failed_count) * i64::from(a.total_runs);
    let rhs = i64::from(a.failed_count) * i64::from(b.total_runs);
    lhs.cmp(&rhs)
        .then_with(|| b.total_runs.cmp(&a.total_runs))
}
