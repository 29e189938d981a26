//! Weekly brief REST endpoints — JSON summary and document downloads.

use crate::rest::{ApiError, AppState};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use copilot_core::DateWindow;
use copilot_metrics::aggregate::{default_window, SegmentPerformance};
use copilot_metrics::{Dataset, WindowComparison};
use copilot_reporting::{compose_brief, export_brief, ExportFormat};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SegmentCtor {
    pub name: String,
    pub ctor: f64,
}

impl From<&SegmentPerformance> for SegmentCtor {
    fn from(s: &SegmentPerformance) -> Self {
        Self {
            name: s.segment_name.clone(),
            ctor: s.ctor,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WeeklyBriefResponse {
    /// `[start, end]`, inclusive.
    pub window: Vec<NaiveDate>,
    pub sends: u64,
    pub opens: u64,
    pub clicks: u64,
    pub open_rate: f64,
    pub ctr: f64,
    pub ctor: f64,
    pub delta_ctor_vs_prev_week: f64,
    pub top_segment: Option<SegmentCtor>,
    pub lagging_segment: Option<SegmentCtor>,
}

/// Trailing window ending on the latest day, compared with the window before it.
fn weekly_comparison(data: &Dataset, window_days: u32) -> Result<WindowComparison, ApiError> {
    let window: DateWindow = default_window(&data.daily, window_days).ok_or(ApiError::NoData)?;
    Ok(WindowComparison::compute(&data.daily, window, &[]))
}

/// GET /brief/weekly — Summary KPIs for the trailing week.
#[utoipa::path(
    get,
    path = "/brief/weekly",
    tag = "Brief",
    responses(
        (status = 200, description = "Weekly engagement summary", body = WeeklyBriefResponse),
        (status = 404, description = "No daily records", body = crate::rest::ErrorResponse),
        (status = 500, description = "Data files unavailable", body = crate::rest::ErrorResponse),
    )
)]
pub async fn weekly_brief(State(state): State<AppState>) -> Result<Json<WeeklyBriefResponse>, ApiError> {
    metrics::counter!("api.brief.requests").increment(1);
    let data = state.load()?;
    let cmp = weekly_comparison(&data, state.window_days)?;

    Ok(Json(WeeklyBriefResponse {
        window: vec![cmp.window.start, cmp.window.end],
        sends: cmp.current.sends,
        opens: cmp.current.opens,
        clicks: cmp.current.clicks,
        open_rate: cmp.current.open_rate,
        ctr: cmp.current.ctr,
        ctor: cmp.current.ctor,
        delta_ctor_vs_prev_week: cmp.ctor_delta(),
        top_segment: cmp.top_segment().map(SegmentCtor::from),
        lagging_segment: cmp.lagging_segment().map(SegmentCtor::from),
    }))
}

/// GET /brief/weekly/export/{format} — Download the weekly brief as md, pdf or pptx.
#[utoipa::path(
    get,
    path = "/brief/weekly/export/{format}",
    tag = "Brief",
    params(
        ("format" = String, Path, description = "One of md, pdf, pptx"),
    ),
    responses(
        (status = 200, description = "Exported brief document"),
        (status = 400, description = "Unsupported format", body = crate::rest::ErrorResponse),
        (status = 404, description = "No daily records", body = crate::rest::ErrorResponse),
        (status = 500, description = "Data files unavailable or rendering failed", body = crate::rest::ErrorResponse),
    )
)]
pub async fn export_weekly_brief(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let format: ExportFormat = format
        .parse()
        .map_err(|e: copilot_core::CopilotError| ApiError::BadRequest(e.to_string()))?;
    metrics::counter!("api.export.requests", "format" => format.extension()).increment(1);

    let data = state.load()?;
    let cmp = weekly_comparison(&data, state.window_days)?;
    let document = export_brief(&compose_brief(&cmp), format)?;
    info!(format = %format, size = document.bytes.len(), window = %cmp.window, "Exported weekly brief");

    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        document.bytes,
    ))
}
