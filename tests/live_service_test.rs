use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use onair::clock::FixedClock;
use onair::config::{Config, SlotConfig};
use onair::error::{OnAirError, Result};
use onair::service::LiveService;
use onair::source::{RemoteSchedule, ScheduleOrigin, ScheduleRow, ScheduleSource};
use std::sync::Arc;

struct StaticRows(Vec<ScheduleRow>);

#[async_trait]
impl RemoteSchedule for StaticRows {
    async fn fetch_rows(&self) -> Result<Vec<ScheduleRow>> {
        Ok(self.0.clone())
    }
}

struct Unreachable;

#[async_trait]
impl RemoteSchedule for Unreachable {
    async fn fetch_rows(&self) -> Result<Vec<ScheduleRow>> {
        Err(OnAirError::network("connection refused"))
    }
}

fn config() -> Config {
    let mut cfg = Config {
        timezone: "UTC".to_string(),
        ..Config::default()
    };
    cfg.schedule.static_table.insert(
        "monday".to_string(),
        vec![SlotConfig {
            start: "06:00".to_string(),
            end: "08:00".to_string(),
            program: "static-morning".to_string(),
        }],
    );
    cfg
}

fn service(remote: Option<Box<dyn RemoteSchedule>>) -> LiveService {
    let cfg = config();
    let fallback = cfg.schedule.to_week().unwrap();
    // 2024-03-04 07:00 UTC is a Monday
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 4, 7, 0, 0).unwrap());
    LiveService::with_parts(cfg, ScheduleSource::new(fallback, remote), Arc::new(clock)).unwrap()
}

fn row(day: i64, start: &str, end: &str, program: &str) -> ScheduleRow {
    ScheduleRow {
        day_of_week: day,
        start_time: start.to_string(),
        end_time: end.to_string(),
        program_id: serde_json::Value::String(program.to_string()),
        is_active: true,
    }
}

#[tokio::test]
async fn remote_rows_take_precedence_for_their_day() {
    let rows = vec![row(1, "06:30:00", "07:30:00", "remote-morning")];
    let svc = service(Some(Box::new(StaticRows(rows))));
    let snap = svc.refresh().await;
    assert_eq!(snap.origin, ScheduleOrigin::Merged);
    assert_eq!(snap.status.live.as_ref().unwrap().program_ref, "remote-morning");
}

#[tokio::test]
async fn remote_rows_for_other_days_keep_static_day() {
    let rows = vec![row(2, "06:00", "08:00", "tuesday-only")];
    let svc = service(Some(Box::new(StaticRows(rows))));
    let snap = svc.refresh().await;
    assert_eq!(snap.origin, ScheduleOrigin::Merged);
    assert_eq!(snap.status.live.as_ref().unwrap().program_ref, "static-morning");
}

#[tokio::test]
async fn failed_remote_falls_back_to_static() {
    let svc = service(Some(Box::new(Unreachable)));
    let snap = svc.refresh().await;
    assert_eq!(snap.origin, ScheduleOrigin::Fallback);
    assert!(snap.status.is_live);
    assert_eq!(snap.status.index, Some(0));
}

#[tokio::test]
async fn snapshot_receiver_sees_refresh() {
    let svc = service(None);
    let rx = svc.snapshot_receiver();
    assert!(rx.borrow().is_none());
    svc.refresh().await;
    let latest = rx.borrow().clone().unwrap();
    assert_eq!(latest.origin, ScheduleOrigin::Static);
    assert_eq!(latest.instant.hour, 7);
}
