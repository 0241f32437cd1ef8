//! # OnAir - live program resolver for a broadcast schedule
//!
//! Decides which program of a weekly broadcast schedule is on air right now,
//! in the broadcaster's own timezone, and serves the answer over a small
//! read-only HTTP API.
//!
//! ## Architecture
//!
//! - `schedule`: schedule model, range matcher and live resolver (pure)
//! - `clock`: wall-clock time decomposed in a named timezone
//! - `source`: static schedule table and the hosted table merged over it
//! - `service`: refresh loop publishing live transitions
//! - `countdown`: countdowns for time-boxed promotional events
//! - `config`: YAML configuration and validation
//! - `logging`: structured logging and tracing
//! - `web`: HTTP server and REST API

pub mod clock;
pub mod config;
pub mod countdown;
pub mod error;
pub mod logging;
pub mod schedule;
pub mod service;
pub mod source;
pub mod web;

#[cfg(test)]
mod web_tests;

// Re-export commonly used types
pub use config::Config;
pub use error::{OnAirError, Result};
pub use schedule::{LiveStatus, ScheduleItem, WeekSchedule, find_live_index, is_in_range};
pub use service::LiveService;
