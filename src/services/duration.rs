use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

/// Number of Monday–Friday days in `[start, end]`. Returns 0 when `end`
/// precedes `start`. No holiday calendar is consulted.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> i32 {
    if end < start {
        return 0;
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_working_day(*day))
        .count() as i32
}

/// Same as [`working_days`], ignoring the time of day of both bounds.
pub fn working_days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i32 {
    working_days(start.date_naive(), end.date_naive())
}

pub fn is_working_day(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}
