use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};

/// Inclusive day count of [start, end]. Callers guarantee start <= end.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// First and last calendar day of (year, month). None for month outside 1..=12
/// or a year chrono cannot represent.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

/// Deadline for an employee to re-edit a pending leave: one day after
/// submission, with the time-of-day capped at 12:00 so late-night requests
/// don't stretch the window into the next afternoon.
pub fn edit_deadline(created_at: DateTime<Utc>) -> DateTime<Utc> {
    let next_day = created_at + Duration::days(1);
    if next_day.time() > NaiveTime::from_hms_opt(12, 0, 0).unwrap() {
        next_day
            .with_hour(12)
            .and_then(|t| t.with_minute(0))
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(next_day)
    } else {
        next_day
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn inclusive_days_counts_both_endpoints() {
        assert_eq!(inclusive_days(d("2025-06-10"), d("2025-06-10")), 1);
        assert_eq!(inclusive_days(d("2025-06-10"), d("2025-06-15")), 6);
        // across a month boundary
        assert_eq!(inclusive_days(d("2025-06-30"), d("2025-07-01")), 2);
    }

    #[test]
    fn month_bounds_handles_leap_year_and_december() {
        assert_eq!(
            month_bounds(2024, 2),
            Some((d("2024-02-01"), d("2024-02-29")))
        );
        assert_eq!(
            month_bounds(2025, 12),
            Some((d("2025-12-01"), d("2025-12-31")))
        );
        assert_eq!(month_bounds(2025, 13), None);
        assert_eq!(month_bounds(2025, 0), None);
    }

    #[test]
    fn edit_deadline_keeps_morning_submissions() {
        let created = Utc.with_ymd_and_hms(2025, 6, 10, 9, 30, 0).unwrap();
        assert_eq!(
            edit_deadline(created),
            Utc.with_ymd_and_hms(2025, 6, 11, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn edit_deadline_caps_afternoon_submissions_at_noon() {
        let created = Utc.with_ymd_and_hms(2025, 6, 10, 18, 45, 12).unwrap();
        assert_eq!(
            edit_deadline(created),
            Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn edit_deadline_noon_exactly_is_not_capped() {
        let created = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert_eq!(
            edit_deadline(created),
            Utc.with_ymd_and_hms(2025, 6, 11, 12, 0, 0).unwrap()
        );
    }
}
