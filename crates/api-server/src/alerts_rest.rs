//! Fatigue alert REST endpoint.

use crate::rest::{ApiError, AppState};
use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use copilot_metrics::alerts::latest_alerts;
use copilot_metrics::FatigueAlert;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AlertResponse {
    pub date: NaiveDate,
    pub segment_id: String,
    #[serde(rename = "EPC_7d")]
    pub epc_7d: Option<f64>,
    pub ctor_7d: Option<f64>,
    pub fatigue_score: f64,
    pub recommendation: String,
}

impl From<FatigueAlert> for AlertResponse {
    fn from(a: FatigueAlert) -> Self {
        Self {
            date: a.date,
            segment_id: a.segment_id,
            epc_7d: a.epc_7d,
            ctor_7d: a.ctor_7d,
            fatigue_score: a.fatigue_score,
            recommendation: a.recommendation,
        }
    }
}

/// GET /fatigue/alerts — Latest-day fatigue and oversaturation alerts.
#[utoipa::path(
    get,
    path = "/fatigue/alerts",
    tag = "Fatigue",
    responses(
        (status = 200, description = "Alerts for the most recent day", body = Vec<AlertResponse>),
        (status = 500, description = "Data files unavailable", body = crate::rest::ErrorResponse),
    )
)]
pub async fn fatigue_alerts(State(state): State<AppState>) -> Result<Json<Vec<AlertResponse>>, ApiError> {
    metrics::counter!("api.alerts.requests").increment(1);
    let rolling = state.store.load_rolling()?;
    let alerts = latest_alerts(&rolling, &[]);
    Ok(Json(alerts.into_iter().map(AlertResponse::from).collect()))
}
