//! Serve-mode API tests: the data endpoint the live view polls.

use actix_web::{App, test, web};
use std::path::Path;

use verdict_lib::api;
use verdict_lib::config::Config;
use verdict_lib::services::generate;

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

fn minimal_run_document() -> serde_json::Value {
    serde_json::json!({
        "run": {
            "id": "019bcad1-9368-7abc-9def-123456789abc",
            "timestamp": "2026-08-01T10:00:00Z",
            "totalTests": 1,
            "passed": 1,
            "failed": 0,
            "skipped": 0,
            "timedOut": 0,
            "pending": 0,
            "duration": 100
        },
        "results": [{
            "id": "t1",
            "name": "smoke > boots",
            "status": "passed",
            "duration": 100,
            "startTime": "2026-08-01T10:00:00Z",
            "endTime": "2026-08-01T10:00:00Z",
            "workerId": 0
        }]
    })
}

async fn app_for(
    config: Config,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new().app_data(web::Data::new(config)).service(
            web::scope("/api/v1")
                .configure(api::configure_health_routes)
                .configure(api::configure_pulse_routes),
        ),
    )
    .await
}

#[actix_web::test]
async fn test_health_is_always_up() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_for(config_in(dir.path())).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/health").to_request(),
    )
    .await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn test_pulse_404_then_200_after_generation() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let app = app_for(config.clone()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/pulse").to_request(),
    )
    .await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    std::fs::write(
        &config.run_file,
        serde_json::to_string(&minimal_run_document()).unwrap(),
    )
    .unwrap();
    generate(&config).await.unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/pulse").to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["run"]["totalTests"], 1);
    assert_eq!(body["results"][0]["id"], "t1");
}

#[actix_web::test]
async fn test_trend_endpoint_returns_series_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    std::fs::write(
        &config.run_file,
        serde_json::to_string(&minimal_run_document()).unwrap(),
    )
    .unwrap();
    generate(&config).await.unwrap();

    let app = app_for(config).await;
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/trend").to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body.is_array());
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["flakinessRate"], 0.0);
}
