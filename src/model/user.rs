use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[serde(skip_serializing)]
    pub password: String,

    /// 1 = manager, 2 = employee
    #[schema(example = 2)]
    pub role_id: u8,

    /// Offboarding date; users past this date drop out of the monthly views
    #[schema(example = "2026-01-01", value_type = String, format = "date", nullable = true)]
    pub end_date: Option<NaiveDate>,

    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Slim projection embedded in the monthly grid/grouping responses.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct UserSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@company.com")]
    pub email: String,
    #[schema(example = 2)]
    pub role_id: u8,
}
