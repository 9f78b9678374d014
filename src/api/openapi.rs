//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Verdict Report Server",
        version = "0.4.0",
        description = "Data endpoint for test-run report payloads, trend series and flaky-test analytics"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        // Pulse data endpoints
        api::pulse::get_pulse,
        api::pulse::get_trend,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            // Payload
            models::RunSummary,
            models::TestStatus,
            models::TestStep,
            models::AttachmentRef,
            models::TrendPoint,
            models::TestOccurrence,
            models::FlakyTestDetail,
            services::attachments::EmbeddedAttachment,
            services::report::payload::RenderedTest,
            services::report::payload::SuiteGroup,
            services::report::payload::WorkerSpan,
            services::report::payload::WorkerLane,
            services::report::payload::WorkerUtilization,
            services::report::payload::ReportPayload,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Pulse", description = "Report payload and trend data")
    )
)]
pub struct ApiDoc;
