#![cfg(test)]

use super::web::*;
use crate::clock::FixedClock;
use crate::config::Config;
use crate::schedule::{DayKey, ScheduleItem, WeekSchedule};
use crate::service::LiveService;
use crate::source::ScheduleSource;
use axum::http::Request;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

fn test_state() -> AppState {
    let mut week = WeekSchedule::new();
    for (s, e, p) in [
        ("05:00", "06:00", "pirith"),
        ("06:00", "08:00", "bana"),
        ("22:00", "02:00", "night-meditation"),
    ] {
        week.push(DayKey::Wednesday, ScheduleItem::parse(s, e, p).unwrap());
    }
    let mut config = Config {
        timezone: "Asia/Colombo".to_string(),
        ..Config::default()
    };
    config.remote.api_key = "secret-key".to_string();
    // 2024-03-06 01:30 UTC is Wednesday 07:00 in Colombo
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 6, 1, 30, 0).unwrap());
    let service =
        LiveService::with_parts(config, ScheduleSource::new(week, None), Arc::new(clock)).unwrap();
    AppState::new(Arc::new(service))
}

async fn get_json(uri: &str) -> (axum::http::StatusCode, serde_json::Value) {
    let router = build_router(test_state());
    let response = router
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_ok() {
    let (status, json) = get_json("/api/health").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn now_uses_configured_zone() {
    let (status, json) = get_json("/api/now").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["timezone"], "Asia/Colombo");
    assert_eq!(json["instant"]["hour"], 7);
    assert_eq!(json["instant"]["minute"], 0);
    assert_eq!(json["instant"]["day"], "wednesday");
}

#[tokio::test]
async fn live_reports_current_slot() {
    let (status, json) = get_json("/api/live").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["status"]["is_live"], true);
    assert_eq!(json["status"]["index"], 1);
    assert_eq!(json["status"]["live"]["program_ref"], "bana");
    assert_eq!(json["status"]["next"]["program_ref"], "night-meditation");
    assert_eq!(json["origin"], "static");
}

#[tokio::test]
async fn schedule_day_marks_live_index() {
    let (status, json) = get_json("/api/schedule/wednesday").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
    assert_eq!(json["live_index"], 1);

    let (_, other) = get_json("/api/schedule/friday").await;
    assert!(other["items"].as_array().unwrap().is_empty());
    assert!(other["live_index"].is_null());
}

#[tokio::test]
async fn schedule_day_rejects_unknown_day() {
    let (status, json) = get_json("/api/schedule/caturday").await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("caturday"));
}

#[tokio::test]
async fn full_schedule_lists_days() {
    let (status, json) = get_json("/api/schedule").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["days"]["wednesday"][0]["start"], "05:00");
}

#[tokio::test]
async fn config_hides_api_key() {
    let (status, json) = get_json("/api/config").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["timezone"], "Asia/Colombo");
    assert!(json["remote"].get("api_key").is_none());
    assert!(json["remote"].get("table").is_some());
}

#[tokio::test]
async fn countdowns_empty_without_events() {
    let (status, json) = get_json("/api/countdowns").await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn events_stream_emits_live_transition() {
    use std::time::Duration;

    let state = test_state();
    let router = build_router(state.clone());
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/events")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let ct = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert!(ct.contains("text/event-stream"));

    // The first refresh is always a transition
    let service = state.service.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        service.refresh().await;
    });

    let mut body = response.into_body();
    let mut buf: Vec<u8> = Vec::new();
    let wait = tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(Ok(frame)) = body.frame().await {
            if let Some(data) = frame.data_ref() {
                buf.extend_from_slice(data);
                if buf.windows(b"bana".len()).any(|w| w == b"bana") {
                    break;
                }
            }
        }
    })
    .await;

    assert!(wait.is_ok(), "timed out waiting for live event");
    let s = String::from_utf8_lossy(&buf);
    assert!(s.contains("event: live"), "missing named event: {}", s);
    assert!(s.contains("data:"), "missing data line: {}", s);
    assert!(s.contains("\"program_ref\":\"bana\""), "unexpected payload: {}", s);
}

#[tokio::test]
async fn serve_reports_bind_failure_as_web_error() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let err = serve(test_state().service, "127.0.0.1", port)
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::OnAirError::Web { .. }));
}
