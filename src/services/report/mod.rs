//! Report assembly: the final stage of the generation pipeline.
//!
//! Combines the current run, the trend series and the flaky-test results,
//! converting terminal markup and inlining attachments per test, into one
//! exportable payload plus the static shell document.

pub mod payload;
pub mod shell;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{FlakyTestDetail, HistoryRecord, RunSummary, TestResult, TrendPoint};
use crate::services::ansi::AnsiMarkupConverter;
use crate::services::attachments::AttachmentEmbedder;
use crate::services::flaky::FlakyTestDetector;
use crate::services::history::HistoryArchiver;
use crate::services::trends::TrendAggregator;

pub use payload::{RenderedTest, ReportPayload};

/// Name of the payload file the data endpoint serves.
pub const PAYLOAD_FILE: &str = "pulse-data.json";

/// Name of the self-contained document.
pub const DOCUMENT_FILE: &str = "index.html";

/// Builds the exportable payload and writes the offline document.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    output_dir: PathBuf,
    embedder: AttachmentEmbedder,
}

impl ReportAssembler {
    /// Create an assembler writing into `output_dir`; attachment paths
    /// resolve against the same root.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        let embedder = AttachmentEmbedder::new(&output_dir);
        ReportAssembler {
            output_dir,
            embedder,
        }
    }

    /// Combine all pipeline outputs into the exportable payload.
    pub async fn assemble(
        &self,
        run: RunSummary,
        results: Vec<TestResult>,
        trend: Vec<TrendPoint>,
        flaky_tests: Vec<FlakyTestDetail>,
    ) -> ReportPayload {
        let suites = payload::group_suites(&results);
        let workers = payload::worker_utilization(&results);

        let mut converter = AnsiMarkupConverter::new();
        let mut rendered = Vec::with_capacity(results.len());
        for result in results {
            rendered.push(self.render_test(&mut converter, result).await);
        }

        ReportPayload {
            run,
            results: rendered,
            trend,
            flaky_tests,
            suites,
            workers,
            generated_at: Utc::now(),
        }
    }

    /// Prepare one test for rendering: markup converted, attachments inlined.
    async fn render_test(
        &self,
        converter: &mut AnsiMarkupConverter,
        result: TestResult,
    ) -> RenderedTest {
        let error_html = result
            .error_message
            .as_deref()
            .map(|message| converter.convert(message));
        let stdout_html = result
            .stdout
            .iter()
            .map(|line| converter.convert(line))
            .collect();

        let screenshots = self.embedder.embed_screenshots(&result.screenshots).await;
        let videos = self.embedder.embed_videos(&result.video_paths).await;
        let trace = self.embedder.embed_trace(result.trace_path.as_deref()).await;
        let attachments = self.embedder.embed_named(&result.attachments).await;

        RenderedTest {
            suite_name: result.suite_or_derived().to_string(),
            id: result.id,
            name: result.name,
            status: result.status,
            duration: result.duration,
            start_time: result.start_time,
            end_time: result.end_time,
            browser: result.browser,
            worker_id: result.worker_id,
            retries: result.retries,
            steps: result.steps,
            error_html,
            stdout_html,
            screenshots,
            videos,
            trace,
            attachments,
            tags: result.tags,
        }
    }

    /// Write `index.html` and the payload JSON into the output directory.
    pub async fn write(&self, payload: &ReportPayload) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create output dir: {}", e)))?;

        let document = shell::render(payload)?;
        let document_path = self.output_dir.join(DOCUMENT_FILE);
        tokio::fs::write(&document_path, document)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write report document: {}", e)))?;

        let json = serde_json::to_string_pretty(payload)
            .map_err(|e| AppError::Storage(format!("Failed to serialize payload: {}", e)))?;
        tokio::fs::write(self.output_dir.join(PAYLOAD_FILE), json)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write payload: {}", e)))?;

        Ok(document_path)
    }
}

/// Run the whole generation pipeline once.
///
/// Sequential by design: archive the current run, load history, aggregate,
/// detect, assemble, write. Only `MissingInput` and `Storage` failures
/// propagate; everything else degrades a single data point upstream.
pub async fn generate(config: &Config) -> AppResult<ReportPayload> {
    let input = read_current_run(&config.run_file).await?;
    info!(
        "Loaded current run {} with {} results",
        input.run.id,
        input.results.len()
    );

    let archiver = HistoryArchiver::new(&config.history_dir);
    archiver.archive(&input.run, &input.results).await?;

    let records = archiver.list().await?;
    info!("History contains {} archived runs", records.len());

    let trend = TrendAggregator::new(config.max_trend_points).aggregate(&records);
    let flaky_tests = FlakyTestDetector::new().analyze(&records);
    if !flaky_tests.is_empty() {
        warn!("{} flaky tests detected across history", flaky_tests.len());
    }

    let assembler = ReportAssembler::new(&config.output_dir);
    let report = assembler
        .assemble(input.run, input.results, trend, flaky_tests)
        .await;
    let document_path = assembler.write(&report).await?;
    info!("Report written to {}", document_path.display());

    Ok(report)
}

/// Load and validate the current-run input document.
///
/// A missing or unparsable file is fatal; so is a document lacking either
/// top-level field.
async fn read_current_run(path: &Path) -> AppResult<HistoryRecord> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::MissingInput(format!("{}: {}", path.display(), e)))?;

    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| AppError::MissingInput(format!("{}: {}", path.display(), e)))?;
    if value.get("run").is_none() || value.get("results").is_none() {
        return Err(AppError::MissingInput(format!(
            "{}: document must contain `run` and `results`",
            path.display()
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::MissingInput(format!("{}: {}", path.display(), e)))
}
