//! Schedule sources
//!
//! The static table comes from configuration. The hosted table, when
//! configured, is queried on every refresh and wins per day: a day with any
//! remote rows uses those rows only, a day without remote rows falls back to
//! the static table as a whole. A failed remote query falls back entirely.

use crate::config::Config;
use crate::error::{OnAirError, Result};
#[cfg(not(feature = "remote"))]
use crate::logging::get_logger;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::schedule::{DayKey, ScheduleItem, TimeOfDay, WeekSchedule};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "remote")]
pub mod remote;

#[cfg(feature = "remote")]
pub use remote::HostedTableClient;

fn default_true() -> bool {
    true
}

/// One row of the hosted schedule table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: i64,

    /// `HH:MM` or `HH:MM:SS`
    pub start_time: String,

    pub end_time: String,

    /// Program reference; string or numeric id
    #[serde(alias = "program")]
    pub program_id: serde_json::Value,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ScheduleRow {
    /// Program reference as a string; `None` for null or structured ids
    pub fn program_ref(&self) -> Option<String> {
        match &self.program_id {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn to_item(&self) -> Result<(DayKey, ScheduleItem)> {
        let day = DayKey::from_index(self.day_of_week).ok_or_else(|| {
            OnAirError::validation(
                "day_of_week",
                format!("out of range: {}", self.day_of_week),
            )
        })?;
        let program = self.program_ref().ok_or_else(|| {
            OnAirError::validation("program_id", "missing program reference")
        })?;
        let item = ScheduleItem::new(
            TimeOfDay::parse(&self.start_time)?,
            TimeOfDay::parse_end(&self.end_time)?,
            program,
        );
        Ok((day, item))
    }
}

/// Group active rows into a week table. Row order within a day is kept;
/// the hosted query orders by start time. Invalid rows are skipped.
pub fn rows_to_week(rows: &[ScheduleRow], logger: &StructuredLogger) -> WeekSchedule {
    let mut week = WeekSchedule::new();
    for row in rows.iter().filter(|r| r.is_active) {
        match row.to_item() {
            Ok((day, item)) => week.push(day, item),
            Err(e) => logger.warn(&format!("Skipping schedule row {:?}: {}", row, e)),
        }
    }
    week
}

/// Remote entries take precedence per day; days absent from `remote` use
/// the whole day from `fallback`. No per-slot merge within a day.
pub fn merge_with_fallback(remote: &WeekSchedule, fallback: &WeekSchedule) -> WeekSchedule {
    let mut merged = WeekSchedule::new();
    for day in DayKey::ALL {
        if remote.contains_day(day) {
            merged.set_day(day, remote.day(day).to_vec());
        } else if fallback.contains_day(day) {
            merged.set_day(day, fallback.day(day).to_vec());
        }
    }
    merged
}

/// Where the current week table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleOrigin {
    /// Static table only (no remote configured)
    Static,
    /// Remote rows merged over the static table
    Merged,
    /// Remote configured but the query failed
    Fallback,
}

/// Provider of raw rows from the hosted table
#[async_trait]
pub trait RemoteSchedule: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<ScheduleRow>>;
}

/// Static table plus an optional remote table
pub struct ScheduleSource {
    fallback: WeekSchedule,
    remote: Option<Box<dyn RemoteSchedule>>,
    logger: StructuredLogger,
}

impl ScheduleSource {
    pub fn new(fallback: WeekSchedule, remote: Option<Box<dyn RemoteSchedule>>) -> Self {
        let logger = get_logger_with_context(
            LogContext::new("source").with_field("remote", remote.is_some().to_string()),
        );
        Self {
            fallback,
            remote,
            logger,
        }
    }

    /// Build from configuration: static table always, hosted table when
    /// enabled and compiled in
    pub fn from_config(config: &Config) -> Result<Self> {
        let fallback = config.schedule.to_week()?;
        let remote: Option<Box<dyn RemoteSchedule>> = Self::remote_from_config(config)?;
        Ok(Self::new(fallback, remote))
    }

    #[cfg(feature = "remote")]
    fn remote_from_config(config: &Config) -> Result<Option<Box<dyn RemoteSchedule>>> {
        if !config.remote.enabled {
            return Ok(None);
        }
        Ok(Some(Box::new(HostedTableClient::new(&config.remote)?)))
    }

    #[cfg(not(feature = "remote"))]
    fn remote_from_config(config: &Config) -> Result<Option<Box<dyn RemoteSchedule>>> {
        if config.remote.enabled {
            get_logger("source")
                .warn("Remote schedule enabled but not compiled in; using static table");
        }
        Ok(None)
    }

    /// Current week table. Evaluated per call; nothing is cached.
    pub async fn load(&self) -> (WeekSchedule, ScheduleOrigin) {
        let Some(remote) = &self.remote else {
            return (self.fallback.clone(), ScheduleOrigin::Static);
        };
        match remote.fetch_rows().await {
            Ok(rows) => {
                let remote_week = rows_to_week(&rows, &self.logger);
                self.logger.debug(&format!(
                    "Fetched {} remote rows ({} usable)",
                    rows.len(),
                    remote_week.slot_count()
                ));
                (
                    merge_with_fallback(&remote_week, &self.fallback),
                    ScheduleOrigin::Merged,
                )
            }
            Err(e) => {
                self.logger
                    .warn(&format!("Remote schedule unavailable, using static table: {}", e));
                (self.fallback.clone(), ScheduleOrigin::Fallback)
            }
        }
    }
}
