use crate::api::task::{MonthQuery, fetch_month_leaves, fetch_month_tasks, fetch_users, user_scope};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::core::calendar::{DayCell, month_grid};
use crate::core::dates::month_bounds;
use crate::model::user::UserSummary;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UserWorkStatus {
    pub user: UserSummary,
    pub days: Vec<DayCell>,
}

/// Manager dashboard grid: one status code per user per day of the month.
/// Pure projection over the stored leave and task rows; nothing is written.
#[utoipa::path(
    get,
    path = "/api/v1/work-status",
    params(MonthQuery),
    responses(
        (status = 200, description = "Per-user day-by-day status grid", body = [UserWorkStatus]),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "WorkStatus"
)]
pub async fn work_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let (first, last) = match month_bounds(query.year, query.month) {
        Some(bounds) => bounds,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Invalid month/year"
            })));
        }
    };

    let scope = match user_scope(&auth, query.user_id) {
        Ok(s) => s,
        Err(resp) => return Ok(resp),
    };

    let users = fetch_users(pool.get_ref(), scope, first).await?;

    let mut statuses = Vec::with_capacity(users.len());
    for user in users {
        let leaves = fetch_month_leaves(pool.get_ref(), user.id, first, last).await?;
        let tasks = fetch_month_tasks(pool.get_ref(), user.id, first, last).await?;

        // month already validated above
        let days = month_grid(query.year, query.month, config.weekend_day, &leaves, &tasks)
            .unwrap_or_default();

        statuses.push(UserWorkStatus { user, days });
    }

    Ok(HttpResponse::Ok().json(statuses))
}
