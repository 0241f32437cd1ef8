//! Wall-clock time in the broadcaster's timezone
//!
//! Every field of a [`CurrentInstant`] is derived from a named IANA zone, never
//! from the host's local zone. There is no timer here; callers decide how
//! often to ask for "now".

use crate::error::{OnAirError, Result};
use crate::schedule::DayKey;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Decomposed "now" in a fixed timezone. Recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentInstant {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub day: DayKey,
    /// Minutes since local midnight (0..=1439)
    pub total_minutes: u16,
}

/// Source of the current UTC time
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Reads the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parse an IANA timezone name such as `Asia/Colombo`
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim().parse::<Tz>().map_err(|e| {
        OnAirError::validation("timezone", format!("unknown timezone '{}': {}", name, e))
    })
}

/// Current instant in the named timezone
pub fn now(timezone_name: &str) -> Result<CurrentInstant> {
    Ok(now_in(parse_timezone(timezone_name)?))
}

/// Current instant in an already parsed timezone
pub fn now_in(tz: Tz) -> CurrentInstant {
    instant_at(Utc::now(), tz)
}

/// Decompose a UTC instant into local fields of `tz`
pub fn instant_at(utc: DateTime<Utc>, tz: Tz) -> CurrentInstant {
    let local = utc.with_timezone(&tz);
    let weekday_name = local.format("%A").to_string();
    let day = day_key_or_default(&weekday_name);

    let hour = u8::try_from(local.hour()).unwrap_or(0);
    let minute = u8::try_from(local.minute()).unwrap_or(0);
    let second = u8::try_from(local.second()).unwrap_or(0);

    CurrentInstant {
        hour,
        minute,
        second,
        day,
        total_minutes: u16::from(hour) * 60 + u16::from(minute),
    }
}

/// Canonical day for a formatted weekday name, falling back to the first
/// canonical day when the name does not resolve.
pub fn day_key_or_default(weekday_name: &str) -> DayKey {
    DayKey::from_name(weekday_name).unwrap_or_else(|| {
        tracing::warn!(
            "Unresolved weekday name '{}'; using '{}'",
            weekday_name,
            DayKey::default()
        );
        DayKey::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decomposes_in_named_zone_not_host_zone() {
        // 2024-03-04 is a Monday; 20:15 UTC is 01:45 Tuesday in Colombo (+05:30)
        let utc = Utc.with_ymd_and_hms(2024, 3, 4, 20, 15, 42).unwrap();
        let tz = parse_timezone("Asia/Colombo").unwrap();
        let now = instant_at(utc, tz);
        assert_eq!(now.hour, 1);
        assert_eq!(now.minute, 45);
        assert_eq!(now.second, 42);
        assert_eq!(now.day, DayKey::Tuesday);
        assert_eq!(now.total_minutes, 105);
    }

    #[test]
    fn utc_zone_keeps_fields() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 3, 7, 30, 0).unwrap();
        let now = instant_at(utc, Tz::UTC);
        assert_eq!((now.hour, now.minute), (7, 30));
        assert_eq!(now.day, DayKey::Sunday);
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert!(parse_timezone("Mars/Olympus_Mons").is_err());
        assert!(now("Not/AZone").is_err());
        assert!(now("UTC").is_ok());
    }

    #[test]
    fn unresolved_day_name_falls_back_to_sunday() {
        assert_eq!(day_key_or_default("Friday"), DayKey::Friday);
        assert_eq!(day_key_or_default("Freitag"), DayKey::Sunday);
        assert_eq!(day_key_or_default(""), DayKey::Sunday);
    }

    #[test]
    fn fixed_clock_is_stable() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now_utc(), clock.now_utc());
    }
}
