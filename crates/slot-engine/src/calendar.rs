//! Calendar helpers for week-sized query windows.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

use crate::interval::Interval;

/// Midnight at the start of `t`'s day.
pub fn day_beginning(t: DateTime<Utc>) -> DateTime<Utc> {
    t.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Midnight of the first Monday strictly after `t`'s day.
pub fn next_monday(t: DateTime<Utc>) -> DateTime<Utc> {
    let days_until_monday = 7 - i64::from(t.weekday().num_days_from_monday());
    day_beginning(t + Duration::days(days_until_monday))
}

/// From `now` until the end of the current week.
pub fn this_week(now: DateTime<Utc>) -> Interval {
    Interval::new(now, next_monday(now))
}

/// The whole of the following Monday-to-Sunday week.
pub fn next_week(now: DateTime<Utc>) -> Interval {
    let start = next_monday(now);
    Interval::new(start, next_monday(start))
}
