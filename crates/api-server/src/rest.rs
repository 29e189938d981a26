//! Shared REST state, error mapping and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use copilot_core::CopilotError;
use copilot_metrics::{DataStore, Dataset};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Shared application state for REST handlers. Holds no data: every
/// request re-reads the CSV files.
#[derive(Clone)]
pub struct AppState {
    pub store: DataStore,
    pub window_days: u32,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: DataStore, window_days: u32) -> Self {
        Self {
            store,
            window_days,
            start_time: Instant::now(),
        }
    }

    pub(crate) fn load(&self) -> Result<Dataset, ApiError> {
        self.store.load().map_err(ApiError::from)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub data_dir: String,
    pub uptime_secs: u64,
}

/// Failures surfaced by the REST handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The daily table has no rows to summarize.
    NoData,
    BadRequest(String),
    Data(CopilotError),
}

impl From<CopilotError> for ApiError {
    fn from(err: CopilotError) -> Self {
        ApiError::Data(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, message) = match self {
            ApiError::NoData => (
                StatusCode::NOT_FOUND,
                "no_data",
                "No daily engagement records available".to_string(),
            ),
            ApiError::BadRequest(message) => {
                warn!(error = %message, "Rejected request");
                (StatusCode::BAD_REQUEST, "invalid_request", message)
            }
            ApiError::Data(CopilotError::Export(message)) => {
                error!(error = %message, "Failed to render brief export");
                metrics::counter!("api.errors").increment(1);
                (StatusCode::INTERNAL_SERVER_ERROR, "export_failed", message)
            }
            ApiError::Data(err) => {
                error!(error = %err, "Failed to load engagement data");
                metrics::counter!("api.errors").increment(1);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "data_unavailable",
                    err.to_string(),
                )
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        data_dir: state.store.dir().display().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Ready once both CSV files are present.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses(
        (status = 200, description = "Data files present"),
        (status = 503, description = "Data files missing"),
    )
)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.store.daily_path().exists() && state.store.rolling_path().exists() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses(
        (status = 200, description = "Process is alive"),
    )
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
