//! Domain models for the report pipeline.

pub mod flaky;
pub mod history;
pub mod run;
pub mod test_result;
pub mod trend;

// Re-export commonly used types
pub use flaky::{FlakyTestDetail, TestOccurrence};
pub use history::HistoryRecord;
pub use run::RunSummary;
pub use test_result::{AttachmentRef, NO_WORKER_SLOT, TestResult, TestStatus, TestStep};
pub use trend::TrendPoint;
