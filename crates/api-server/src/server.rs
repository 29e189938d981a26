//! API server — builds the router and serves it over HTTP.

use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use crate::{alerts_rest, brief_rest};
use axum::routing::get;
use axum::Router;
use copilot_core::config::AppConfig;
use copilot_metrics::DataStore;
use std::net::SocketAddr;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Build the read-only API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Brief and alert endpoints
        .route("/brief/weekly", get(brief_rest::weekly_brief))
        .route(
            "/brief/weekly/export/:format",
            get(brief_rest::export_weekly_brief),
        )
        .route("/fatigue/alerts", get(alerts_rest::fatigue_alerts))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ApiServer {
    config: AppConfig,
}

impl ApiServer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Start the HTTP server. Blocks until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState::new(
            DataStore::new(self.config.data.dir.clone()),
            self.config.brief.window_days,
        );
        let app = router(state);

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, data_dir = %self.config.data.dir.display(), "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus exporter on a separate port when enabled.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            return Ok(());
        }
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
