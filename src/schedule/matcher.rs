//! `[start, end)` membership for slot time ranges, in minutes since midnight.

use super::types::MINUTES_PER_DAY;

/// Whether `current` falls inside the slot `[start, end)`.
///
/// All values are minutes since midnight (0..=1439). An `end` of `0` is the
/// end-of-day sentinel and behaves like 1440, so `22:00-00:00` stays within
/// the same day. Any other `end <= start` wraps past midnight and matches on
/// both sides of it. Out-of-range input is not validated.
pub const fn is_in_range(current: u16, start: u16, end: u16) -> bool {
    let normalized_end = if end == 0 { MINUTES_PER_DAY } else { end };
    if start < normalized_end {
        start <= current && current < normalized_end
    } else {
        // Wrapping slot: compare against the unnormalized end
        current >= start || current < end
    }
}
