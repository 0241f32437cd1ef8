//! Countdown for time-boxed promotional events
//!
//! An event is `Upcoming` until it starts, `Running` until it ends and then
//! `Ended`. Events without an end never end once started.

use crate::config::EventConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownPhase {
    Upcoming,
    Running,
    Ended,
}

/// Remaining time split into display units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
}

impl Remaining {
    pub fn from_seconds(total_seconds: i64) -> Self {
        let total_seconds = total_seconds.max(0);
        Self {
            days: total_seconds / 86_400,
            hours: (total_seconds % 86_400) / 3_600,
            minutes: (total_seconds % 3_600) / 60,
            seconds: total_seconds % 60,
            total_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub phase: CountdownPhase,

    /// Time until the next phase change; `None` once ended or when open-ended
    pub remaining: Option<Remaining>,
}

impl Countdown {
    /// Countdown state of an event window at `now`
    pub fn at(
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if now < starts_at {
            return Self {
                phase: CountdownPhase::Upcoming,
                remaining: Some(Remaining::from_seconds((starts_at - now).num_seconds())),
            };
        }
        match ends_at {
            Some(end) if now >= end => Self {
                phase: CountdownPhase::Ended,
                remaining: None,
            },
            Some(end) => Self {
                phase: CountdownPhase::Running,
                remaining: Some(Remaining::from_seconds((end - now).num_seconds())),
            },
            None => Self {
                phase: CountdownPhase::Running,
                remaining: None,
            },
        }
    }

    pub fn for_event(event: &EventConfig, now: DateTime<Utc>) -> Self {
        Self::at(event.starts_at, event.ends_at, now)
    }
}

/// Event paired with its countdown
#[derive(Debug, Clone, Serialize)]
pub struct EventCountdown {
    pub id: String,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub countdown: Countdown,
}

/// Events still worth showing at `now` (not ended), soonest start first.
/// The carousel rotates through this list.
pub fn visible_events(events: &[EventConfig], now: DateTime<Utc>) -> Vec<EventCountdown> {
    let mut visible: Vec<EventCountdown> = events
        .iter()
        .map(|e| EventCountdown {
            id: e.id.clone(),
            title: e.title.clone(),
            starts_at: e.starts_at,
            ends_at: e.ends_at,
            countdown: Countdown::for_event(e, now),
        })
        .filter(|e| e.countdown.phase != CountdownPhase::Ended)
        .collect();
    visible.sort_by_key(|e| e.starts_at);
    visible
}
