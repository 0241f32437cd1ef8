use crate::error::{OnAirError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Minutes in one day; also the normalized value of a `00:00` slot end
pub const MINUTES_PER_DAY: u16 = 1440;

/// Canonical day keys, in the order used by the hosted table (0 = Sunday)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    #[default]
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayKey {
    /// All seven days in canonical order
    pub const ALL: [DayKey; 7] = [
        DayKey::Sunday,
        DayKey::Monday,
        DayKey::Tuesday,
        DayKey::Wednesday,
        DayKey::Thursday,
        DayKey::Friday,
        DayKey::Saturday,
    ];

    /// Canonical index (0 = Sunday .. 6 = Saturday)
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Day for a canonical index; `None` outside 0..=6
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Lowercase English day name
    pub const fn as_str(self) -> &'static str {
        match self {
            DayKey::Sunday => "sunday",
            DayKey::Monday => "monday",
            DayKey::Tuesday => "tuesday",
            DayKey::Wednesday => "wednesday",
            DayKey::Thursday => "thursday",
            DayKey::Friday => "friday",
            DayKey::Saturday => "saturday",
        }
    }

    /// Look up a day by its English name, ignoring case and surrounding whitespace
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }

}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayKey {
    type Err = OnAirError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
            .ok_or_else(|| OnAirError::validation("day", format!("unknown day key '{}'", s)))
    }
}

/// Wall-clock time of day with minute precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Midnight; as a slot end it means "until the end of the day"
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub const fn hour(self) -> u8 {
        self.hour
    }

    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Minutes since midnight (0..=1439)
    pub const fn minutes(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Parse `HH:MM`. A trailing `:SS` (database `time` columns) is accepted
    /// and the seconds are dropped.
    pub fn parse(input: &str) -> Result<Self> {
        let (hour, minute, _) = split_fields(input)?;
        Self::new(hour, minute).ok_or_else(|| invalid_time(input))
    }

    /// Parse a slot end. Like [`TimeOfDay::parse`], but `24:00` (or
    /// `24:00:00`) is also accepted and maps to the `00:00` end-of-day sentinel.
    pub fn parse_end(input: &str) -> Result<Self> {
        match split_fields(input)? {
            (24, 0, 0) => Ok(Self::MIDNIGHT),
            (hour, minute, _) => Self::new(hour, minute).ok_or_else(|| invalid_time(input)),
        }
    }
}

fn invalid_time(input: &str) -> OnAirError {
    OnAirError::validation("time", format!("invalid time '{}'", input))
}

/// Split `H:MM`, `HH:MM` or `HH:MM:SS` into numeric fields. Only the digit
/// layout and the seconds range are checked here.
fn split_fields(input: &str) -> Result<(u8, u8, u8)> {
    let invalid = || invalid_time(input);
    let digits = |part: &str, min_len: usize| {
        if part.len() < min_len || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        part.parse::<u8>().map_err(|_| invalid())
    };

    let mut parts = input.trim().split(':');
    let hour = digits(parts.next().ok_or_else(invalid)?, 1)?;
    let minute = digits(parts.next().ok_or_else(invalid)?, 2)?;
    let second = match parts.next() {
        Some(part) => digits(part, 2)?,
        None => 0,
    };
    if parts.next().is_some() || second >= 60 {
        return Err(invalid());
    }
    Ok((hour, minute, second))
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = OnAirError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = OnAirError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// One program slot on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Inclusive start
    pub start: TimeOfDay,

    /// Exclusive end; `00:00` runs to the end of the day
    pub end: TimeOfDay,

    /// Opaque reference to the program metadata
    pub program_ref: String,
}

impl ScheduleItem {
    pub fn new(start: TimeOfDay, end: TimeOfDay, program_ref: impl Into<String>) -> Self {
        Self {
            start,
            end,
            program_ref: program_ref.into(),
        }
    }

    /// Build a slot from `HH:MM` strings; the end may be `24:00`
    pub fn parse(start: &str, end: &str, program_ref: impl Into<String>) -> Result<Self> {
        Ok(Self::new(
            TimeOfDay::parse(start)?,
            TimeOfDay::parse_end(end)?,
            program_ref,
        ))
    }

    /// Whether the slot wraps past midnight into the next day.
    /// A `00:00` end is the end-of-day sentinel and never wraps.
    pub const fn crosses_midnight(&self) -> bool {
        let end = self.end.minutes();
        end != 0 && end <= self.start.minutes()
    }
}

/// Ordered slots of a single day
pub type DaySchedule = Vec<ScheduleItem>;

/// Day-keyed schedule table. Slot order within a day is kept as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekSchedule {
    days: BTreeMap<DayKey, DaySchedule>,
}

impl WeekSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots for a day; an absent day is an empty day
    pub fn day(&self, day: DayKey) -> &[ScheduleItem] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the table carries an entry for the day at all
    pub fn contains_day(&self, day: DayKey) -> bool {
        self.days.contains_key(&day)
    }

    /// Replace a whole day
    pub fn set_day(&mut self, day: DayKey, items: DaySchedule) {
        self.days.insert(day, items);
    }

    /// Append one slot to the end of a day
    pub fn push(&mut self, day: DayKey, item: ScheduleItem) {
        self.days.entry(day).or_default().push(item);
    }

    /// Total number of slots across all days
    pub fn slot_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}
