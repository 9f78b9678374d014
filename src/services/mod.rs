//! Report pipeline services.

pub mod ansi;
pub mod attachments;
pub mod flaky;
pub mod history;
pub mod report;
pub mod trends;

pub use ansi::AnsiMarkupConverter;
pub use attachments::{AttachmentEmbedder, EmbeddedAttachment};
pub use flaky::FlakyTestDetector;
pub use history::HistoryArchiver;
pub use report::{ReportAssembler, ReportPayload, generate};
pub use trends::TrendAggregator;
