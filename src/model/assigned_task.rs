use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Manager-assigned to-do item. `date` is the authoritative business day the
/// item belongs to; created_at only records when the row was written.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct AssignedTask {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Acme Corp")]
    pub company_name: String,
    #[schema(example = "Prepare the quarterly deck")]
    pub task_title: String,
    pub is_done: bool,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
