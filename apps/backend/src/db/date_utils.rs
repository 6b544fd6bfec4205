//! Date utilities for daily reset hour handling.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Timelike};

/// Study day for the current local time.
///
/// Before `daily_reset_hour` the previous calendar day is still "today", so
/// late-night sessions count towards the day they started.
pub fn today(daily_reset_hour: u32) -> NaiveDate {
    study_day(Local::now(), daily_reset_hour)
}

/// Study day for an arbitrary instant.
pub fn study_day<Tz: TimeZone>(now: DateTime<Tz>, daily_reset_hour: u32) -> NaiveDate {
    if now.hour() < daily_reset_hour {
        (now - Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}
