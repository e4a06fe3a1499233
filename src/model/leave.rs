use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveType {
    Full,
    Half,
    Early,
    Late,
    WorkFromHome,
}

impl LeaveType {
    /// Short code shown in the monthly grid.
    pub fn code(self) -> &'static str {
        match self {
            LeaveType::Full => "L",
            LeaveType::Half => "HL",
            LeaveType::Early => "E",
            LeaveType::Late => "LT",
            LeaveType::WorkFromHome => "WFH",
        }
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Leave {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "full", value_type = String)]
    pub leave_type: LeaveType,
    #[schema(example = "pending", value_type = String)]
    pub status: LeaveStatus,
    #[schema(example = "Family emergency")]
    pub reason: String,
    /// Inclusive day count of [start_date, end_date]
    #[schema(example = 3)]
    pub days: i64,
    #[schema(example = "10:00:00", value_type = String, nullable = true)]
    pub start_time: Option<NaiveTime>,
    #[schema(example = "14:00:00", value_type = String, nullable = true)]
    pub end_time: Option<NaiveTime>,
    #[schema(example = "Approved, plan handover", nullable = true)]
    pub manager_comment: Option<String>,
    pub is_edited: bool,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}
