//! Live program service
//!
//! Owns the refresh cadence around the pure resolver: every tick it loads the
//! week table, reads the clock, resolves the live slot and publishes the
//! result. Transitions (a different slot, or going on/off air) are logged and
//! broadcast as JSON for the SSE stream.

use crate::clock::{Clock, CurrentInstant, SystemClock, instant_at, parse_timezone};
use crate::config::Config;
use crate::countdown::{EventCountdown, visible_events};
use crate::error::Result;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::schedule::{LiveStatus, WeekSchedule, resolve};
use crate::source::{ScheduleOrigin, ScheduleSource};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Latest resolution, shared with the web layer
#[derive(Debug, Clone, Serialize)]
pub struct LiveSnapshot {
    /// RFC 3339 time of the refresh
    pub refreshed_at: String,

    pub timezone: String,

    pub instant: CurrentInstant,

    pub status: LiveStatus,

    pub origin: ScheduleOrigin,

    /// Week table the status was resolved against
    pub schedule: WeekSchedule,

    /// Number of refreshes since start
    pub refresh_count: u64,
}

/// Event published on every live transition
#[derive(Debug, Clone, Serialize)]
pub struct LiveTransition<'a> {
    pub previous: Option<&'a LiveStatus>,
    pub current: &'a LiveStatus,
    pub refreshed_at: &'a str,
}

pub struct LiveService {
    config: Config,
    tz: Tz,
    source: ScheduleSource,
    clock: Arc<dyn Clock>,
    logger: StructuredLogger,
    status_tx: broadcast::Sender<String>,
    snapshot_tx: watch::Sender<Option<Arc<LiveSnapshot>>>,
    /// Held for a whole refresh so transitions are diffed one at a time
    refresh_lock: Mutex<()>,
}

impl LiveService {
    /// Build from configuration with the system clock
    pub fn new(config: Config) -> Result<Self> {
        let source = ScheduleSource::from_config(&config)?;
        Self::with_parts(config, source, Arc::new(SystemClock))
    }

    /// Build with an explicit schedule source and clock
    pub fn with_parts(
        config: Config,
        source: ScheduleSource,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let tz = parse_timezone(&config.timezone)?;
        let logger = get_logger_with_context(
            LogContext::new("service").with_timezone(&config.timezone),
        );
        let (status_tx, _status_rx) = broadcast::channel::<String>(100);
        let (snapshot_tx, _snapshot_rx) = watch::channel(None);
        Ok(Self {
            config,
            tz,
            source,
            clock,
            logger,
            status_tx,
            snapshot_tx,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// "Now" in the configured timezone; recomputed on every call
    pub fn current_instant(&self) -> CurrentInstant {
        instant_at(self.clock.now_utc(), self.tz)
    }

    /// Promotional events still visible now
    pub fn events(&self) -> Vec<EventCountdown> {
        visible_events(&self.config.events, self.clock.now_utc())
    }

    /// Subscribe to live transitions (JSON)
    pub fn subscribe_status(&self) -> broadcast::Receiver<String> {
        self.status_tx.subscribe()
    }

    /// Receiver of the latest snapshot; `None` until the first refresh
    pub fn snapshot_receiver(&self) -> watch::Receiver<Option<Arc<LiveSnapshot>>> {
        self.snapshot_tx.subscribe()
    }

    pub fn latest(&self) -> Option<Arc<LiveSnapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    /// Latest snapshot, refreshing once if none has been published yet
    pub async fn latest_or_refresh(&self) -> Arc<LiveSnapshot> {
        let _guard = self.refresh_lock.lock().await;
        match self.latest() {
            Some(snapshot) => snapshot,
            None => self.refresh_locked().await,
        }
    }

    /// Load, resolve and publish once
    pub async fn refresh(&self) -> Arc<LiveSnapshot> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Arc<LiveSnapshot> {
        let (schedule, origin) = self.source.load().await;
        let now_utc = self.clock.now_utc();
        let instant = instant_at(now_utc, self.tz);
        let status = resolve(&schedule, &instant);

        let previous = self.latest();
        let snapshot = Arc::new(LiveSnapshot {
            refreshed_at: now_utc.to_rfc3339(),
            timezone: self.config.timezone.clone(),
            instant,
            status,
            origin,
            schedule,
            refresh_count: previous.as_ref().map_or(1, |p| p.refresh_count + 1),
        });

        let prev_status = previous.as_ref().map(|p| &p.status);
        if prev_status.is_none_or(|p| !p.same_slot(&snapshot.status)) {
            self.publish_transition(prev_status, &snapshot);
        } else {
            self.logger.trace(&format!(
                "No change at {} {}",
                snapshot.status.day, snapshot.status.at
            ));
        }

        self.snapshot_tx.send_replace(Some(snapshot.clone()));
        snapshot
    }

    fn publish_transition(&self, previous: Option<&LiveStatus>, snapshot: &LiveSnapshot) {
        let current = &snapshot.status;
        match &current.live {
            Some(item) => self.logger.info(&format!(
                "On air: '{}' ({}-{}) on {} at {}",
                item.program_ref, item.start, item.end, current.day, current.at
            )),
            None => self
                .logger
                .info(&format!("Off air on {} at {}", current.day, current.at)),
        }

        let event = LiveTransition {
            previous,
            current,
            refreshed_at: &snapshot.refreshed_at,
        };
        match serde_json::to_string(&event) {
            // No subscribers is fine
            Ok(payload) => {
                let _ = self.status_tx.send(payload);
            }
            Err(e) => self
                .logger
                .error(&format!("Failed to serialize live transition: {}", e)),
        }
    }

    /// Refresh on the configured cadence until `shutdown` turns true
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let period = Duration::from_secs(self.config.refresh_interval_secs.max(1));
        self.logger.info(&format!(
            "Starting live refresh loop every {}s",
            period.as_secs()
        ));

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.logger.info("Live refresh loop stopped");
        Ok(())
    }
}
