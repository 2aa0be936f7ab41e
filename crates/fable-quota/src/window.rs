//! Quota window reset arithmetic

use fable_config::MonthlyWindow;

/// Length of the daily quota window
pub const DAY_SECS: u64 = 24 * 60 * 60;

/// Length of a rolling monthly quota window
pub const ROLLING_MONTH_SECS: u64 = 30 * DAY_SECS;

/// Unix second when a monthly window entered at `now` resets
///
/// Calendar windows reset at the first instant of the next UTC month;
/// when that cannot be computed the window falls back to rolling.
pub fn monthly_reset(window: MonthlyWindow, now: u64) -> u64 {
    match window {
        MonthlyWindow::Rolling => now + ROLLING_MONTH_SECS,
        MonthlyWindow::Calendar => next_calendar_month(now).unwrap_or(now + ROLLING_MONTH_SECS),
    }
}

fn next_calendar_month(now: u64) -> Option<u64> {
    let timestamp = jiff::Timestamp::from_second(i64::try_from(now).ok()?).ok()?;
    let today = timestamp.to_zoned(jiff::tz::TimeZone::UTC).date();
    let next = today
        .first_of_month()
        .checked_add(jiff::Span::new().months(1))
        .ok()?;
    let midnight = next.to_zoned(jiff::tz::TimeZone::UTC).ok()?;
    u64::try_from(midnight.timestamp().as_second()).ok()
}
