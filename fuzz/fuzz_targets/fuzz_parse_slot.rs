#![no_main]
use libfuzzer_sys::fuzz_target;
use onair::schedule::{ScheduleItem, find_live_index, is_in_range};

fuzz_target!(|data: &[u8]| {
    // Split the input into start/end strings around the first '|'
    let text = String::from_utf8_lossy(data);
    let (start, end) = text.split_once('|').unwrap_or((text.as_ref(), "00:00"));

    if let Ok(item) = ScheduleItem::parse(start, end, "fuzz") {
        let day = [item];
        for minute in [0u16, 1, 719, 1439] {
            let hit = find_live_index(&day, (minute / 60) as u8, (minute % 60) as u8).is_some();
            let end_minutes = day[0].end.minutes();
            assert_eq!(hit, is_in_range(minute, day[0].start.minutes(), end_minutes));
        }
    }
});
