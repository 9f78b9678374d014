//! Trend aggregation: one metrics point per archived run.

use crate::models::{HistoryRecord, TrendPoint};

/// Default cap on the trend series length.
pub const DEFAULT_MAX_TREND_POINTS: usize = 15;

/// Maps history records to a chronologically ordered metrics series.
///
/// The series is capped to the most recent `max_points` records to bound
/// downstream rendering cost.
#[derive(Debug, Clone)]
pub struct TrendAggregator {
    max_points: usize,
}

impl Default for TrendAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TREND_POINTS)
    }
}

impl TrendAggregator {
    pub fn new(max_points: usize) -> Self {
        TrendAggregator { max_points }
    }

    /// Map each record to one point, oldest first.
    pub fn aggregate(&self, records: &[HistoryRecord]) -> Vec<TrendPoint> {
        let mut points: Vec<TrendPoint> = records.iter().map(TrendPoint::from_record).collect();
        points.sort_by_key(|point| point.date);

        let start = points.len().saturating_sub(self.max_points);
        points.split_off(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunSummary;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn record(timestamp: DateTime<Utc>, flakiness_rate: Option<f64>) -> HistoryRecord {
        HistoryRecord {
            run: RunSummary {
                id: Uuid::new_v4(),
                timestamp,
                total_tests: 10,
                passed: 8,
                failed: 1,
                skipped: 1,
                timed_out: 0,
                pending: 0,
                duration: 60_000,
                flakiness_rate,
                environment: serde_json::Value::Null,
            },
            results: Vec::new(),
        }
    }

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_one_point_per_record_in_chronological_order() {
        let records = vec![
            record(ts(1), None),
            record(ts(2), None),
            record(ts(3), None),
        ];
        let points = TrendAggregator::default().aggregate(&records);

        assert_eq!(points.len(), records.len());
        assert_eq!(points[0].date, ts(1));
        assert_eq!(points[1].date, ts(2));
        assert_eq!(points[2].date, ts(3));
    }

    #[test]
    fn test_unsorted_input_comes_out_sorted() {
        let records = vec![record(ts(3), None), record(ts(1), None), record(ts(2), None)];
        let points = TrendAggregator::default().aggregate(&records);

        assert!(points.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_missing_flakiness_rate_defaults_to_zero() {
        let records = vec![record(ts(1), None), record(ts(2), Some(0.25))];
        let points = TrendAggregator::default().aggregate(&records);

        assert_eq!(points[0].flakiness_rate, 0.0);
        assert_eq!(points[1].flakiness_rate, 0.25);
    }

    #[test]
    fn test_series_capped_to_most_recent_records() {
        let records: Vec<HistoryRecord> = (1..=20).map(|day| record(ts(day), None)).collect();
        let points = TrendAggregator::new(5).aggregate(&records);

        assert_eq!(points.len(), 5);
        assert_eq!(points[0].date, ts(16));
        assert_eq!(points[4].date, ts(20));
    }

    #[test]
    fn test_empty_history_yields_empty_series() {
        assert!(TrendAggregator::default().aggregate(&[]).is_empty());
    }
}
