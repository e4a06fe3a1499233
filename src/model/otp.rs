use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Single active reset code per email; reissue purges the old rows.
#[derive(Debug, FromRow)]
pub struct Otp {
    pub id: u64,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}
