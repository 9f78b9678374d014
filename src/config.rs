//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Development default values.
pub mod defaults {
    pub const RUN_FILE: &str = "pulse-run.json";
    pub const OUTPUT_DIR: &str = "pulse-report";
    pub const MAX_TREND_POINTS: usize = 15;
    pub const HOST: &str = "127.0.0.1";
    pub const PORT: u16 = 8090;
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Current-run JSON document produced by the test runner
    pub run_file: PathBuf,
    /// Directory the report (index.html, pulse-data.json) is written to
    pub output_dir: PathBuf,
    /// Directory holding one history record per archived run
    pub history_dir: PathBuf,
    /// Cap on the trend series length (most recent N records)
    pub max_trend_points: usize,
    /// Serve-mode host address
    pub host: String,
    /// Serve-mode port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables have defaults; paths are resolved relative to the
    /// working directory.
    ///
    /// Environment variables:
    /// - `VERDICT_RUN_FILE`: Current-run JSON path (default: pulse-run.json)
    /// - `VERDICT_OUTPUT_DIR`: Report output directory (default: pulse-report)
    /// - `VERDICT_HISTORY_DIR`: History directory (default: <output>/history)
    /// - `VERDICT_MAX_TREND_POINTS`: Trend series cap (default: 15)
    /// - `VERDICT_HOST`: Serve-mode host (default: 127.0.0.1)
    /// - `VERDICT_PORT`: Serve-mode port (default: 8090)
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_file = env::var("VERDICT_RUN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::RUN_FILE));

        let output_dir = env::var("VERDICT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::OUTPUT_DIR));

        let history_dir = env::var("VERDICT_HISTORY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| output_dir.join("history"));

        let max_trend_points = env::var("VERDICT_MAX_TREND_POINTS")
            .unwrap_or_else(|_| defaults::MAX_TREND_POINTS.to_string())
            .parse::<usize>()
            .map_err(|_| {
                ConfigError::InvalidValue("VERDICT_MAX_TREND_POINTS must be a valid number")
            })?;

        if max_trend_points == 0 {
            return Err(ConfigError::InvalidValue(
                "VERDICT_MAX_TREND_POINTS must be at least 1",
            ));
        }

        let host = env::var("VERDICT_HOST").unwrap_or_else(|_| defaults::HOST.to_string());

        let port = env::var("VERDICT_PORT")
            .unwrap_or_else(|_| defaults::PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("VERDICT_PORT must be a valid port number"))?;

        Ok(Config {
            run_file,
            output_dir,
            history_dir,
            max_trend_points,
            host,
            port,
        })
    }

    /// Get the serve-mode bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),
}
