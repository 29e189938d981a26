//! End-to-end tests for the read-only API over a scratch data directory.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use copilot_api::{router, AppState};
use copilot_core::DailySegmentRecord;
use copilot_metrics::rolling::build_rolling;
use copilot_metrics::synthetic::{write_example_data, SyntheticSpec};
use copilot_metrics::DataStore;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn synthetic_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new(dir.path());
    let spec = SyntheticSpec {
        anchor: NaiveDate::from_ymd_opt(2025, 9, 28).unwrap(),
        days: 28,
        seed: 42,
    };
    write_example_data(&store, &spec).unwrap();
    (dir, router(AppState::new(store, 7)))
}

fn oversaturated_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new(dir.path());
    let daily: Vec<DailySegmentRecord> = (1..=10)
        .flat_map(|d| {
            [("HOT", 1000, 150), ("COOL", 1000, 900)].map(|(id, sends, unique)| {
                DailySegmentRecord {
                    date: NaiveDate::from_ymd_opt(2025, 9, d).unwrap(),
                    segment_id: id.to_string(),
                    segment_name: format!("{id} segment"),
                    sends,
                    opens: 300,
                    clicks: 30,
                    unsubs: 1,
                    spam_complaints: 0,
                    unique_contacts_reached: unique,
                }
            })
        })
        .collect();
    store.write_daily(&daily).unwrap();
    store.write_rolling(&build_rolling(&daily)).unwrap();
    (dir, router(AppState::new(store, 7)))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_weekly_brief_summary() {
    let (_dir, app) = synthetic_app();
    let (status, json) = get_json(&app, "/brief/weekly").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["window"][0], "2025-09-22");
    assert_eq!(json["window"][1], "2025-09-28");
    for key in ["open_rate", "ctr", "ctor"] {
        let v = json[key].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&v), "{key} out of range: {v}");
    }
    assert!(json["sends"].as_u64().unwrap() >= 7 * 3 * 600);
    assert!(json["delta_ctor_vs_prev_week"].is_number());

    let top = json["top_segment"]["ctor"].as_f64().unwrap();
    let lag = json["lagging_segment"]["ctor"].as_f64().unwrap();
    assert!(top >= lag);
}

#[tokio::test]
async fn test_synthetic_data_raises_no_alerts() {
    let (_dir, app) = synthetic_app();
    let (status, json) = get_json(&app, "/fatigue/alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, Value::Array(vec![]));
}

#[tokio::test]
async fn test_oversaturated_segment_is_alerted() {
    let (_dir, app) = oversaturated_app();
    let (status, json) = get_json(&app, "/fatigue/alerts").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = json.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["segment_id"], "HOT");
    assert_eq!(alerts[0]["date"], "2025-09-10");
    assert!(alerts[0]["EPC_7d"].as_f64().unwrap() > 4.0);
    assert_eq!(alerts[0]["fatigue_score"], 1.0);
    assert!(alerts[0]["recommendation"]
        .as_str()
        .unwrap()
        .starts_with("Throttle non-essential journeys"));
}

#[tokio::test]
async fn test_export_downloads() {
    let (_dir, app) = synthetic_app();

    let (status, headers, body) = get(&app, "/brief/weekly/export/pdf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "application/pdf");
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=\"weekly_brief.pdf\""
    );
    assert!(body.starts_with(b"%PDF-"));

    let (status, _, body) = get(&app, "/brief/weekly/export/md").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("# Eloqua Performance Brief (2025-09-22 to 2025-09-28)"));

    let (status, _, body) = get(&app, "/brief/weekly/export/pptx").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn test_unknown_export_format_is_bad_request() {
    let (_dir, app) = synthetic_app();
    let (status, json) = get_json(&app, "/brief/weekly/export/docx").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn test_missing_files_are_server_errors() {
    let dir = tempfile::tempdir().unwrap();
    let app = router(AppState::new(DataStore::new(dir.path()), 7));

    let (status, json) = get_json(&app, "/brief/weekly").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "data_unavailable");

    let (status, _, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _, _) = get(&app, "/live").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_tables_report_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let store = DataStore::new(dir.path());
    store.write_daily(&[]).unwrap();
    store.write_rolling(&[]).unwrap();
    let app = router(AppState::new(store, 7));

    let (status, json) = get_json(&app, "/brief/weekly").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "no_data");

    let (status, json) = get_json(&app, "/fatigue/alerts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, Value::Array(vec![]));
}

#[tokio::test]
async fn test_health_reports_data_dir() {
    let (dir, app) = synthetic_app();
    let (status, json) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["data_dir"], dir.path().display().to_string());
    let (status, _, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
}
