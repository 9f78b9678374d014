//! End-to-end tests driving the whole generation pipeline: archive, load
//! history, aggregate, detect, assemble, write.

use std::path::Path;

use verdict_lib::config::Config;
use verdict_lib::error::AppError;
use verdict_lib::services::generate;
use verdict_lib::services::report::{DOCUMENT_FILE, PAYLOAD_FILE};

fn config_in(root: &Path) -> Config {
    Config {
        run_file: root.join("pulse-run.json"),
        output_dir: root.join("report"),
        history_dir: root.join("report").join("history"),
        max_trend_points: 15,
        host: "127.0.0.1".to_string(),
        port: 8090,
    }
}

/// Current-run document in the runner's wire format.
fn run_document(timestamp: &str, t1_status: &str) -> serde_json::Value {
    serde_json::json!({
        "run": {
            "id": "019bcad1-9368-7abc-9def-123456789abc",
            "timestamp": timestamp,
            "totalTests": 3,
            "passed": (if t1_status == "passed" { 2 } else { 1 }),
            "failed": (if t1_status == "passed" { 0 } else { 1 }),
            "skipped": 1,
            "timedOut": 0,
            "pending": 0,
            "duration": 4200,
            "environment": {"os": "linux", "ci": {"provider": "github"}}
        },
        "results": [
            {
                "id": "t1",
                "name": "checkout > pays with saved card",
                "suiteName": "checkout",
                "status": t1_status,
                "duration": 1800,
                "startTime": timestamp,
                "endTime": timestamp,
                "browser": "chromium",
                "workerId": 0,
                "retries": (if t1_status == "failed" { 2 } else { 0 }),
                "errorMessage": (if t1_status == "failed" {
                    serde_json::Value::from("\u{1b}[31mcard declined\u{1b}[0m")
                } else {
                    serde_json::Value::Null
                }),
                "stdout": ["\u{1b}[1msubmitting payment\u{1b}[0m"],
                "screenshots": ["shots/pay.png", "shots/never-captured.png"]
            },
            {
                "id": "t2",
                "name": "checkout > shows receipt",
                "suiteName": "checkout",
                "status": "passed",
                "duration": 900,
                "startTime": timestamp,
                "endTime": timestamp,
                "browser": "chromium",
                "workerId": 1
            },
            {
                "id": "t3",
                "name": "search > finds nothing",
                "status": "skipped",
                "duration": 0,
                "startTime": timestamp,
                "endTime": timestamp,
                "workerId": -1
            }
        ]
    })
}

fn write_run_file(config: &Config, timestamp: &str, t1_status: &str) {
    std::fs::write(
        &config.run_file,
        serde_json::to_string_pretty(&run_document(timestamp, t1_status)).unwrap(),
    )
    .unwrap();
}

#[actix_web::test]
async fn test_single_generation_writes_document_history_and_payload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(config.output_dir.join("shots")).unwrap();
    std::fs::write(config.output_dir.join("shots/pay.png"), b"png").unwrap();
    write_run_file(&config, "2026-08-01T10:00:00Z", "failed");

    let payload = generate(&config).await.unwrap();

    // One archived record, one trend point, no flaky data yet.
    assert_eq!(payload.trend.len(), 1);
    assert!(payload.flaky_tests.is_empty());
    assert_eq!(payload.results.len(), 3);

    // Markup converted and attachments resolved per item.
    let t1 = payload.results.iter().find(|t| t.id == "t1").unwrap();
    assert_eq!(
        t1.error_html.as_deref(),
        Some("<span style=\"color: #cd3131\">card declined</span>")
    );
    assert_eq!(t1.screenshots.len(), 1, "missing screenshot must be dropped");

    // Heuristic suite grouping: explicit field for t1/t2, derived for t3.
    let names: Vec<&str> = payload.suites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["checkout", "search"]);

    // Sentinel worker kept out of the timeline but listed.
    assert_eq!(payload.workers.lanes.len(), 2);
    assert_eq!(payload.workers.unassigned, vec!["t3"]);

    assert!(config.output_dir.join(DOCUMENT_FILE).exists());
    assert!(config.output_dir.join(PAYLOAD_FILE).exists());
    assert_eq!(std::fs::read_dir(&config.history_dir).unwrap().count(), 1);

    let html = std::fs::read_to_string(config.output_dir.join(DOCUMENT_FILE)).unwrap();
    assert!(html.contains("id=\"pulse-data\""));
    assert!(html.contains("tab-workers"));
}

#[actix_web::test]
async fn test_history_accumulates_and_flaky_tests_surface() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(&config.output_dir).unwrap();

    write_run_file(&config, "2026-08-01T10:00:00Z", "passed");
    generate(&config).await.unwrap();

    write_run_file(&config, "2026-08-02T10:00:00Z", "failed");
    let payload = generate(&config).await.unwrap();

    assert_eq!(payload.trend.len(), 2);
    assert!(payload.trend[0].date < payload.trend[1].date);
    // Both points lack a reported flakiness rate.
    assert_eq!(payload.trend[0].flakiness_rate, 0.0);

    // t1 passed then failed across the two archived runs.
    assert_eq!(payload.flaky_tests.len(), 1);
    let flaky = &payload.flaky_tests[0];
    assert_eq!(flaky.id, "t1");
    assert_eq!(flaky.passed_count, 1);
    assert_eq!(flaky.failed_count, 1);
    assert_eq!(flaky.total_runs, 2);
}

#[actix_web::test]
async fn test_identical_timestamps_do_not_overwrite_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(&config.output_dir).unwrap();

    write_run_file(&config, "2026-08-01T10:00:00Z", "passed");
    generate(&config).await.unwrap();
    generate(&config).await.unwrap();

    assert_eq!(std::fs::read_dir(&config.history_dir).unwrap().count(), 2);
}

#[actix_web::test]
async fn test_malformed_history_file_degrades_one_point_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(&config.history_dir).unwrap();
    std::fs::write(config.history_dir.join("run-corrupt.json"), "{oops").unwrap();

    write_run_file(&config, "2026-08-01T10:00:00Z", "passed");
    let payload = generate(&config).await.unwrap();

    // The corrupt record is skipped; the fresh archive still counts.
    assert_eq!(payload.trend.len(), 1);
}

#[actix_web::test]
async fn test_missing_run_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let err = generate(&config).await.unwrap_err();
    assert!(matches!(err, AppError::MissingInput(_)));
    assert!(err.is_fatal());
}

#[actix_web::test]
async fn test_run_file_without_results_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::write(&config.run_file, r#"{"run": {}}"#).unwrap();

    let err = generate(&config).await.unwrap_err();
    assert!(matches!(err, AppError::MissingInput(_)));
}
