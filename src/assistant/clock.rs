//! Wall-clock source for time and date responses

use chrono::{DateTime, Local};

/// Source of the current local time
pub trait Clock {
    /// Current local time, read at the instant of the call
    fn now(&self) -> DateTime<Local>;
}

/// Host wall clock in the host's default timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Format a time as zero-padded 24-hour `HH:MM`
#[must_use]
pub fn format_time(now: &DateTime<Local>) -> String {
    now.format("%H:%M").to_string()
}

/// Format a date as `Month DD, YYYY`
#[must_use]
pub fn format_date(now: &DateTime<Local>) -> String {
    now.format("%B %d, %Y").to_string()
}
