use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Rich-text editors submit this when the employee typed nothing.
pub const EMPTY_RICH_TEXT: &str = "<p><br></p>";

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    Present,
    Absent,
}

/// One daily log per (user_id, date); date is the normalized business day.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Task {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "<p>Shipped the billing report</p>")]
    pub content: String,
    #[schema(example = "Good progress", nullable = true)]
    pub manager_comment: Option<String>,
    #[schema(example = "present", value_type = String)]
    pub status: TaskStatus,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether the daily log carries real content. Empty strings and the
    /// rich-text placeholder count as "nothing submitted".
    pub fn has_content(&self) -> bool {
        let trimmed = self.content.trim();
        !trimmed.is_empty() && trimmed != EMPTY_RICH_TEXT
    }
}
