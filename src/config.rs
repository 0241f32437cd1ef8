//! Configuration management for OnAir
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files. `ONAIR_CONFIG` names an explicit file.

use crate::error::{OnAirError, Result};
use crate::schedule::{DayKey, ScheduleItem, WeekSchedule};
use chrono::{DateTime, Utc};
#[cfg(feature = "openapi")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

mod defaults;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "ONAIR_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct Config {
    /// IANA timezone the schedule is written in
    pub timezone: String,

    /// How often the live program is re-resolved, in seconds
    pub refresh_interval_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,

    /// Static schedule table
    pub schedule: ScheduleConfig,

    /// Hosted schedule table; takes precedence per day when enabled
    pub remote: RemoteConfig,

    /// Time-boxed promotional events with a countdown
    pub events: Vec<EventConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console level override
    #[serde(default)]
    pub console_level: Option<String>,

    /// Optional file level override
    #[serde(default)]
    pub file_level: Option<String>,

    /// Path to log file (its directory receives the rolling files)
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
pub struct WebConfig {
    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

/// One slot of the static table, times in `HH:MM`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
pub struct SlotConfig {
    /// Start time in HH:MM format (inclusive)
    pub start: String,

    /// End time in HH:MM format (exclusive, 00:00 = end of day)
    pub end: String,

    /// Program reference
    pub program: String,
}

/// Static schedule table keyed by lowercase day name
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
pub struct ScheduleConfig {
    /// Ordered slots per day (`sunday` .. `saturday`)
    #[serde(default)]
    pub static_table: BTreeMap<String, Vec<SlotConfig>>,
}

/// Hosted schedule table (REST interface of the managed database)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
#[serde(default)]
pub struct RemoteConfig {
    /// Whether to query the hosted table
    pub enabled: bool,

    /// Project base URL, e.g. https://xyz.example.co
    pub url: String,

    /// Anonymous API key sent as `apikey` and bearer token
    pub api_key: String,

    /// Table holding the schedule rows
    pub table: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Promotional event shown with a countdown
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(JsonSchema))]
pub struct EventConfig {
    /// Stable identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Event start (RFC 3339)
    pub starts_at: DateTime<Utc>,

    /// Event end; open-ended when absent
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl ScheduleConfig {
    /// Parse the static table into a week schedule, keeping slot order
    pub fn to_week(&self) -> Result<WeekSchedule> {
        let mut week = WeekSchedule::new();
        for (key, slots) in &self.static_table {
            let day = DayKey::from_name(key).ok_or_else(|| {
                OnAirError::validation(
                    format!("schedule.static_table.{}", key),
                    "unknown day key".to_string(),
                )
            })?;
            if week.contains_day(day) {
                return Err(OnAirError::validation(
                    "schedule.static_table",
                    format!("day '{}' listed more than once (key '{}')", day, key),
                ));
            }
            let mut items = Vec::with_capacity(slots.len());
            for (i, slot) in slots.iter().enumerate() {
                let item = ScheduleItem::parse(&slot.start, &slot.end, slot.program.clone())
                    .map_err(|e| {
                        OnAirError::validation(
                            format!("schedule.static_table.{}[{}]", key, i),
                            e.to_string(),
                        )
                    })?;
                items.push(item);
            }
            week.set_day(day, items);
        }
        Ok(week)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `ONAIR_CONFIG` or the default locations
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(path);
        }

        let default_paths = [
            "onair_config.yaml",
            "/data/onair_config.yaml",
            "/etc/onair/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::clock::parse_timezone(&self.timezone)?;

        if self.refresh_interval_secs == 0 {
            return Err(OnAirError::validation(
                "refresh_interval_secs",
                "Must be greater than 0",
            ));
        }

        if self.web.port == 0 {
            return Err(OnAirError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        self.schedule.to_week()?;

        if self.remote.enabled {
            if self.remote.url.trim().is_empty() {
                return Err(OnAirError::validation(
                    "remote.url",
                    "URL cannot be empty when remote is enabled",
                ));
            }
            if self.remote.table.trim().is_empty() {
                return Err(OnAirError::validation(
                    "remote.table",
                    "Table cannot be empty when remote is enabled",
                ));
            }
        }

        for event in &self.events {
            if let Some(end) = event.ends_at
                && end < event.starts_at
            {
                return Err(OnAirError::validation(
                    format!("events.{}.ends_at", event.id),
                    "Must not be before starts_at".to_string(),
                ));
            }
        }

        Ok(())
    }
}
