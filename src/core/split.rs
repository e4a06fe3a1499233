use chrono::{Duration, NaiveDate};

use crate::core::dates::inclusive_days;

/// One contiguous date range carved out of a leave record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
}

impl Segment {
    fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Segment {
            start_date,
            end_date,
            days: inclusive_days(start_date, end_date),
        }
    }
}

/// How one leave record decomposes around a single overridden day. The flank
/// segments inherit the original record's fields; `target` takes the
/// manager's override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPlan {
    pub before: Option<Segment>,
    pub target: Segment,
    pub after: Option<Segment>,
}

impl SplitPlan {
    pub fn segment_count(&self) -> usize {
        1 + self.before.is_some() as usize + self.after.is_some() as usize
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SplitError {
    /// Target day falls outside [start_date, end_date].
    TargetOutOfRange,
}

/// Decompose [start, end] around `target`. Pure; the caller owns persistence
/// and must apply the whole plan (inserts + delete of the original) in one
/// transaction.
pub fn plan_split(
    start: NaiveDate,
    end: NaiveDate,
    target: NaiveDate,
) -> Result<SplitPlan, SplitError> {
    if target < start || target > end {
        return Err(SplitError::TargetOutOfRange);
    }

    let before = (target > start).then(|| Segment::new(start, target - Duration::days(1)));
    let after = (target < end).then(|| Segment::new(target + Duration::days(1), end));

    Ok(SplitPlan {
        before,
        target: Segment::new(target, target),
        after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn interior_split_yields_three_tiling_segments() {
        // Leave 2025-06-10..15 (6 days), override 06-12
        let plan = plan_split(d("2025-06-10"), d("2025-06-15"), d("2025-06-12")).unwrap();

        assert_eq!(plan.segment_count(), 3);

        let before = plan.before.unwrap();
        assert_eq!(before.start_date, d("2025-06-10"));
        assert_eq!(before.end_date, d("2025-06-11"));
        assert_eq!(before.days, 2);

        assert_eq!(plan.target.start_date, d("2025-06-12"));
        assert_eq!(plan.target.end_date, d("2025-06-12"));
        assert_eq!(plan.target.days, 1);

        let after = plan.after.unwrap();
        assert_eq!(after.start_date, d("2025-06-13"));
        assert_eq!(after.end_date, d("2025-06-15"));
        assert_eq!(after.days, 3);

        assert_eq!(before.days + plan.target.days + after.days, 6);
    }

    #[test]
    fn split_at_start_drops_before_segment() {
        let plan = plan_split(d("2025-06-10"), d("2025-06-15"), d("2025-06-10")).unwrap();
        assert_eq!(plan.segment_count(), 2);
        assert!(plan.before.is_none());
        assert_eq!(plan.target.days, 1);
        assert_eq!(plan.after.unwrap().start_date, d("2025-06-11"));
    }

    #[test]
    fn split_at_end_drops_after_segment() {
        let plan = plan_split(d("2025-06-10"), d("2025-06-15"), d("2025-06-15")).unwrap();
        assert_eq!(plan.segment_count(), 2);
        assert!(plan.after.is_none());
        assert_eq!(plan.before.unwrap().end_date, d("2025-06-14"));
    }

    #[test]
    fn single_day_leave_splits_into_just_the_target() {
        let plan = plan_split(d("2025-06-10"), d("2025-06-10"), d("2025-06-10")).unwrap();
        assert_eq!(plan.segment_count(), 1);
        assert!(plan.before.is_none());
        assert!(plan.after.is_none());
    }

    #[test]
    fn target_outside_range_is_rejected() {
        assert_eq!(
            plan_split(d("2025-06-10"), d("2025-06-15"), d("2025-06-09")),
            Err(SplitError::TargetOutOfRange)
        );
        assert_eq!(
            plan_split(d("2025-06-10"), d("2025-06-15"), d("2025-06-16")),
            Err(SplitError::TargetOutOfRange)
        );
    }

    #[test]
    fn segments_always_reconstruct_the_original_range() {
        let start = d("2025-06-10");
        let end = d("2025-06-15");
        let original_days = inclusive_days(start, end);

        let mut day = start;
        while day <= end {
            let plan = plan_split(start, end, day).unwrap();

            let mut ranges = Vec::new();
            if let Some(s) = plan.before {
                ranges.push(s);
            }
            ranges.push(plan.target);
            if let Some(s) = plan.after {
                ranges.push(s);
            }

            // no gaps, no overlaps, endpoints preserved
            assert_eq!(ranges.first().unwrap().start_date, start);
            assert_eq!(ranges.last().unwrap().end_date, end);
            for pair in ranges.windows(2) {
                assert_eq!(
                    pair[1].start_date,
                    pair[0].end_date + chrono::Duration::days(1)
                );
            }

            let total: i64 = ranges.iter().map(|s| s.days).sum();
            assert_eq!(total, original_days);

            day += chrono::Duration::days(1);
        }
    }
}
