use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{PlannerError, PlannerResult};

pub fn add_minutes(dt: NaiveDateTime, minutes: i64) -> PlannerResult<NaiveDateTime> {
    Duration::try_minutes(minutes)
        .and_then(|delta| dt.checked_add_signed(delta))
        .ok_or_else(|| {
            PlannerError::date_arithmetic(format!("{dt} + {minutes} minutes"))
        })
}

pub fn add_days(date: NaiveDate, days: i64) -> PlannerResult<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| PlannerError::date_arithmetic(format!("{date} + {days} days")))
}

pub fn add_months(date: NaiveDate, months: u32) -> PlannerResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| PlannerError::date_arithmetic(format!("{date} + {months} months")))
}

/// Fractional hours from `from` to `to`; negative when `to` is earlier.
pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    to.signed_duration_since(from).num_seconds() as f64 / 3600.0
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Whole months from the month of `from` to the month of `to`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_monday() as i64))
        .unwrap_or(NaiveDate::MIN)
}

pub fn to_naive_time(total_minutes: u32) -> NaiveTime {
    let total_minutes = total_minutes % (24 * 60);
    NaiveTime::from_hms_opt(total_minutes / 60, total_minutes % 60, 0).unwrap_or(NaiveTime::MIN)
}

/// Inclusive list of dates from `start` to `end`.
pub fn dates_in(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|date| *date <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_conversions_wrap_at_midnight() {
        assert_eq!(to_naive_time(9 * 60 + 30), NaiveTime::from_hms_opt(9, 30, 0).expect("time"));
        assert_eq!(to_naive_time(24 * 60), NaiveTime::MIN);
    }

    #[test]
    fn week_start_is_monday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 5, 11).expect("date");
        assert_eq!(week_start(sunday), NaiveDate::from_ymd_opt(2025, 5, 5).expect("date"));
    }

    #[test]
    fn add_minutes_reports_overflow_instead_of_panicking() {
        let a = NaiveDate::from_ymd_opt(2025, 5, 1).expect("date").and_hms_opt(9, 0, 0).expect("time");
        assert_eq!(add_minutes(a, 90).ok(), a.checked_add_signed(Duration::minutes(90)));
        assert!(matches!(add_minutes(a, 1_000_000_000_000), Err(PlannerError::DateArithmetic(_))));
        assert!(matches!(add_minutes(a, i64::MAX), Err(PlannerError::DateArithmetic(_))));
        assert!(add_days(NaiveDate::MAX, 1).is_err());
    }
}
