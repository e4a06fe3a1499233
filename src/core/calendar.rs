use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::dates::month_bounds;
use crate::model::leave::{Leave, LeaveStatus, LeaveType};
use crate::model::task::{Task, TaskStatus};

/// Classification of a single calendar day for one employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    Weekend,
    /// On leave; `worked` when a real daily log was also filed that day.
    Leave { kind: LeaveType, worked: bool },
    Present,
    Absent,
    NoSubmission,
}

impl DayStatus {
    /// Short code the dashboard grid renders.
    pub fn code(self) -> String {
        match self {
            DayStatus::Weekend => "W".to_string(),
            DayStatus::Leave { kind, worked: false } => kind.code().to_string(),
            DayStatus::Leave { kind, worked: true } => format!("{}+P", kind.code()),
            DayStatus::Present => "P".to_string(),
            DayStatus::Absent => "A".to_string(),
            DayStatus::NoSubmission => "NS".to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayCell {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    /// W | P | A | NS | L | HL | E | LT | WFH | "<leave>+P"
    #[schema(example = "P")]
    pub status: String,
}

/// Classify one day from the employee's records. Precedence: weekend, then
/// leave, then the daily log, then "no submission". Rejected leaves never
/// shade a day.
pub fn day_status(day: NaiveDate, weekend: Weekday, leaves: &[Leave], tasks: &[Task]) -> DayStatus {
    if day.weekday() == weekend {
        return DayStatus::Weekend;
    }

    let task = tasks.iter().find(|t| t.date == day);

    let leave = leaves
        .iter()
        .find(|l| l.status != LeaveStatus::Rejected && l.start_date <= day && day <= l.end_date);

    if let Some(l) = leave {
        return DayStatus::Leave {
            kind: l.leave_type,
            worked: task.map(Task::has_content).unwrap_or(false),
        };
    }

    match task {
        Some(t) if t.status == TaskStatus::Absent => DayStatus::Absent,
        Some(t) if t.has_content() => DayStatus::Present,
        _ => DayStatus::NoSubmission,
    }
}

/// One cell per day of (year, month). Pure read-side projection; never
/// mutates anything. Returns None for an invalid month.
pub fn month_grid(
    year: i32,
    month: u32,
    weekend: Weekday,
    leaves: &[Leave],
    tasks: &[Task],
) -> Option<Vec<DayCell>> {
    let (first, last) = month_bounds(year, month)?;

    let mut cells = Vec::with_capacity(last.day() as usize);
    let mut day = first;
    while day <= last {
        cells.push(DayCell {
            date: day,
            status: day_status(day, weekend, leaves, tasks).code(),
        });
        day += chrono::Duration::days(1);
    }
    Some(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dates::inclusive_days;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn leave(start: &str, end: &str, kind: LeaveType, status: LeaveStatus) -> Leave {
        let start_date = d(start);
        let end_date = d(end);
        Leave {
            id: 1,
            user_id: 7,
            start_date,
            end_date,
            leave_type: kind,
            status,
            reason: "test".to_string(),
            days: inclusive_days(start_date, end_date),
            start_time: None,
            end_time: None,
            manager_comment: None,
            is_edited: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn task(date: &str, content: &str, status: TaskStatus) -> Task {
        Task {
            id: 1,
            user_id: 7,
            date: d(date),
            content: content.to_string(),
            manager_comment: None,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn empty_month_renders_all_no_submission_or_weekend() {
        let cells = month_grid(2025, 6, Weekday::Sun, &[], &[]).unwrap();
        assert_eq!(cells.len(), 30);
        for cell in &cells {
            if cell.date.weekday() == Weekday::Sun {
                assert_eq!(cell.status, "W");
            } else {
                assert_eq!(cell.status, "NS");
            }
        }
    }

    #[test]
    fn weekend_wins_over_leave_and_task() {
        // 2025-06-15 is a Sunday
        let leaves = vec![leave(
            "2025-06-13",
            "2025-06-16",
            LeaveType::Full,
            LeaveStatus::Approved,
        )];
        let tasks = vec![task("2025-06-15", "<p>worked anyway</p>", TaskStatus::Present)];
        assert_eq!(
            day_status(d("2025-06-15"), Weekday::Sun, &leaves, &tasks),
            DayStatus::Weekend
        );
    }

    #[test]
    fn leave_day_with_filed_log_is_marked_worked() {
        let leaves = vec![leave(
            "2025-06-10",
            "2025-06-12",
            LeaveType::Half,
            LeaveStatus::Approved,
        )];
        let tasks = vec![task("2025-06-11", "<p>half day output</p>", TaskStatus::Present)];

        assert_eq!(
            day_status(d("2025-06-11"), Weekday::Sun, &leaves, &tasks),
            DayStatus::Leave {
                kind: LeaveType::Half,
                worked: true
            }
        );
        assert_eq!(
            day_status(d("2025-06-10"), Weekday::Sun, &leaves, &tasks),
            DayStatus::Leave {
                kind: LeaveType::Half,
                worked: false
            }
        );
    }

    #[test]
    fn empty_rich_text_counts_as_no_submission() {
        let tasks = vec![
            task("2025-06-10", "<p><br></p>", TaskStatus::Present),
            task("2025-06-11", "   ", TaskStatus::Present),
            task("2025-06-12", "", TaskStatus::Present),
        ];
        for day in ["2025-06-10", "2025-06-11", "2025-06-12"] {
            assert_eq!(
                day_status(d(day), Weekday::Sun, &[], &tasks),
                DayStatus::NoSubmission
            );
        }
    }

    #[test]
    fn absent_task_row_renders_absent() {
        let tasks = vec![task("2025-06-10", "", TaskStatus::Absent)];
        assert_eq!(
            day_status(d("2025-06-10"), Weekday::Sun, &[], &tasks),
            DayStatus::Absent
        );
    }

    #[test]
    fn rejected_leave_is_ignored() {
        let leaves = vec![leave(
            "2025-06-10",
            "2025-06-12",
            LeaveType::Full,
            LeaveStatus::Rejected,
        )];
        assert_eq!(
            day_status(d("2025-06-11"), Weekday::Sun, &leaves, &[]),
            DayStatus::NoSubmission
        );
    }

    #[test]
    fn leave_day_codes_compose_with_worked_marker() {
        assert_eq!(
            DayStatus::Leave {
                kind: LeaveType::WorkFromHome,
                worked: false
            }
            .code(),
            "WFH"
        );
        assert_eq!(
            DayStatus::Leave {
                kind: LeaveType::Full,
                worked: true
            }
            .code(),
            "L+P"
        );
    }

    #[test]
    fn aggregated_leave_days_match_the_days_field() {
        // Mon..Sat leave with no Sunday inside; weekend day set to Sunday so
        // every leave day surfaces in the grid.
        let l = leave("2025-06-09", "2025-06-14", LeaveType::Full, LeaveStatus::Approved);
        let leaves = vec![l.clone()];

        let cells = month_grid(2025, 6, Weekday::Sun, &leaves, &[]).unwrap();
        let shaded = cells.iter().filter(|c| c.status == "L").count() as i64;
        assert_eq!(shaded, l.days);
    }
}
