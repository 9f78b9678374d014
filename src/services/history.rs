//! History archive: one immutable JSON record per completed run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{HistoryRecord, RunSummary, TestResult};

/// Persists completed runs under a history directory and lists them back.
///
/// Records are write-once: `archive` never overwrites an existing file, and
/// nothing in the pipeline mutates a record after it is written.
#[derive(Debug, Clone)]
pub struct HistoryArchiver {
    dir: PathBuf,
}

impl HistoryArchiver {
    /// Create an archiver rooted at `dir`. The directory is created lazily
    /// on the first `archive` call.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HistoryArchiver { dir: dir.into() }
    }

    /// Archive one completed run.
    ///
    /// The filename is derived from the run timestamp. Two runs landing in
    /// the same timestamp granularity get a monotonic numeric suffix
    /// (`-2`, `-3`, ...) so neither record is overwritten.
    pub async fn archive(&self, run: &RunSummary, results: &[TestResult]) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create history dir: {}", e)))?;

        let record = HistoryRecord {
            run: run.clone(),
            results: results.to_vec(),
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| AppError::Storage(format!("Failed to serialize history record: {}", e)))?;

        let stem = file_stem(run.timestamp);
        let mut path = self.dir.join(format!("{}.json", stem));
        let mut suffix = 2u32;
        while path_exists(&path).await {
            path = self.dir.join(format!("{}-{}.json", stem, suffix));
            suffix += 1;
        }

        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write history record: {}", e)))?;

        info!("Archived run {} to {}", run.id, path.display());
        Ok(path)
    }

    /// List all structurally valid records, sorted ascending by run
    /// timestamp.
    ///
    /// A missing history directory yields an empty list. Each file parses
    /// independently: unreadable or malformed files are skipped with a
    /// warning and the rest of the listing proceeds.
    pub async fn list(&self) -> AppResult<Vec<HistoryRecord>> {
        if !path_exists(&self.dir).await {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read history dir: {}", e)))?;

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read history dir: {}", e)))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = read_record(&path).await {
                records.push(record);
            }
        }

        records.sort_by_key(|record| record.run.timestamp);
        Ok(records)
    }
}

/// Parse one history file, classifying failures without propagating them.
async fn read_record(path: &Path) -> Option<HistoryRecord> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            warn!(
                "{}",
                AppError::MalformedHistory(format!("{}: {}", path.display(), e))
            );
            return None;
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            warn!(
                "{}",
                AppError::MalformedHistory(format!("{}: {}", path.display(), e))
            );
            return None;
        }
    };

    // A record without both top-level fields is excluded from aggregation
    // rather than treated as a parse failure.
    if value.get("run").is_none() || value.get("results").is_none() {
        warn!(
            "{}",
            AppError::Inconsistent(format!("{}: missing run/results", path.display()))
        );
        return None;
    }

    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(
                "{}",
                AppError::MalformedHistory(format!("{}: {}", path.display(), e))
            );
            None
        }
    }
}

/// Filename stem for a run timestamp, filesystem-safe on every platform.
fn file_stem(timestamp: DateTime<Utc>) -> String {
    format!("run-{}", timestamp.format("%Y-%m-%dT%H-%M-%S-%3fZ"))
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
