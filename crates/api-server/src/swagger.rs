//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Engagement Copilot API",
        version = "0.1.0",
        description = "Read-only email engagement metrics.\n\nServes the weekly CTOR brief, latest-day fatigue alerts, and brief exports recomputed from the daily segment CSV files on every request.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Brief", description = "Weekly engagement summary and brief downloads"),
        (name = "Fatigue", description = "Latest-day fatigue and oversaturation alerts"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Brief
        crate::brief_rest::weekly_brief,
        crate::brief_rest::export_weekly_brief,
        // Fatigue
        crate::alerts_rest::fatigue_alerts,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        crate::brief_rest::WeeklyBriefResponse,
        crate::brief_rest::SegmentCtor,
        crate::alerts_rest::AlertResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/brief/weekly",
            "/brief/weekly/export/{format}",
            "/fatigue/alerts",
            "/health",
            "/ready",
            "/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
