//! Broadcast schedule model and the live program resolver
//!
//! A week table maps each day to its ordered slots. The matcher decides
//! whether a minute of the day falls inside one slot; the resolver scans a day
//! and reports the (at most one) slot on air.

pub mod matcher;
pub mod resolver;
pub mod types;

pub use matcher::is_in_range;
pub use resolver::{LiveStatus, find_live_index, find_next_index, resolve};
pub use types::{DayKey, DaySchedule, MINUTES_PER_DAY, ScheduleItem, TimeOfDay, WeekSchedule};
