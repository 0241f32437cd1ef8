//! Live program resolution over a day's ordered slots

use super::matcher::is_in_range;
use super::types::{DayKey, ScheduleItem, TimeOfDay, WeekSchedule};
use crate::clock::CurrentInstant;
use serde::Serialize;

/// Index of the slot airing at `hour:minute`, or `None` when off air.
///
/// Slots are scanned in list order and the first match wins, so overlapping
/// data resolves to the earliest-listed slot. The list is never re-sorted.
pub fn find_live_index(day: &[ScheduleItem], hour: u8, minute: u8) -> Option<usize> {
    let current = u16::from(hour) * 60 + u16::from(minute);
    day.iter()
        .position(|item| is_in_range(current, item.start.minutes(), item.end.minutes()))
}

/// Index of the first slot, in list order, starting strictly after `hour:minute`
pub fn find_next_index(day: &[ScheduleItem], hour: u8, minute: u8) -> Option<usize> {
    let current = u16::from(hour) * 60 + u16::from(minute);
    day.iter().position(|item| item.start.minutes() > current)
}

/// Resolution result handed to presentation code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveStatus {
    /// Day the instant was resolved against
    pub day: DayKey,

    /// Local time the status was resolved at
    pub at: TimeOfDay,

    /// Index of the live slot within the day
    pub index: Option<usize>,

    pub is_live: bool,

    /// The live slot itself
    pub live: Option<ScheduleItem>,

    /// Index of the next slot to start later the same day
    pub next_index: Option<usize>,

    pub next: Option<ScheduleItem>,
}

impl LiveStatus {
    /// Whether both statuses point at the same slot on the same day
    pub fn same_slot(&self, other: &LiveStatus) -> bool {
        self.day == other.day && self.index == other.index && self.live == other.live
    }
}

/// Resolve an instant against a week table. A day absent from the table is
/// treated as an empty day.
pub fn resolve(week: &WeekSchedule, instant: &CurrentInstant) -> LiveStatus {
    let day = week.day(instant.day);
    let index = find_live_index(day, instant.hour, instant.minute);
    let next_index = find_next_index(day, instant.hour, instant.minute);
    LiveStatus {
        day: instant.day,
        at: TimeOfDay::new(instant.hour, instant.minute).unwrap_or(TimeOfDay::MIDNIGHT),
        index,
        is_live: index.is_some(),
        live: index.and_then(|i| day.get(i).cloned()),
        next_index,
        next: next_index.and_then(|i| day.get(i).cloned()),
    }
}
