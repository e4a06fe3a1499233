use crate::auth::auth::AuthUser;
use crate::core::dates::month_bounds;
use crate::core::merge::{DoneFlagPatch, merge_done_flags};
use crate::model::assigned_task::AssignedTask;
use crate::model::leave::Leave;
use crate::model::task::{Task, TaskStatus};
use crate::model::user::UserSummary;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct SubmitTask {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "<p>Shipped the billing report</p>")]
    pub content: String,
    #[schema(example = "present", nullable = true)]
    pub status: Option<TaskStatus>,
    /// Done-flag toggles for existing assignments; all other fields ignored
    #[serde(default)]
    pub assigned_tasks: Vec<DoneFlagPatch>,
}

#[derive(Deserialize, ToSchema)]
pub struct NewAssignment {
    #[schema(example = "Acme Corp")]
    pub company_name: String,
    #[schema(example = "Prepare the quarterly deck")]
    pub task_title: String,
    #[serde(default)]
    pub is_done: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct AssignTasks {
    #[schema(example = 1000)]
    pub user_id: u64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Focus on the deck first", nullable = true)]
    pub manager_comment: Option<String>,
    /// Full replacement of the day's assignment set
    pub assigned_tasks: Vec<NewAssignment>,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    pub month: u32,
    pub year: i32,
    /// Restrict to one user (employees are always restricted to themselves)
    pub user_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct TaskWithAssignments {
    pub task: Task,
    pub assigned_tasks: Vec<AssignedTask>,
}

#[derive(Serialize, ToSchema)]
pub struct UserMonthGroup {
    pub user: UserSummary,
    pub leaves: Vec<Leave>,
    pub tasks: Vec<TaskWithAssignments>,
}

/* =========================
Submit / update own daily log
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = SubmitTask,
    responses(
        (status = 200, description = "Daily log saved"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn submit_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SubmitTask>,
) -> actix_web::Result<impl Responder> {
    let status = payload.status.unwrap_or(TaskStatus::Present);

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to begin task transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // one row per (user, day); re-submission overwrites the content
    sqlx::query(
        r#"
        INSERT INTO tasks (user_id, date, content, status)
        VALUES (?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE content = VALUES(content), status = VALUES(status)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.date)
    .bind(&payload.content)
    .bind(status)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to upsert daily log");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if !payload.assigned_tasks.is_empty() {
        let existing = sqlx::query_as::<_, AssignedTask>(
            r#"
            SELECT id, user_id, date, company_name, task_title, is_done, created_at
            FROM assigned_tasks
            WHERE user_id = ? AND date = ?
            "#,
        )
        .bind(auth.user_id)
        .bind(payload.date)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to load assignments");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

        // only the done flag moves; company/title always keep their stored values
        for row in merge_done_flags(&existing, &payload.assigned_tasks) {
            sqlx::query("UPDATE assigned_tasks SET is_done = ? WHERE id = ? AND user_id = ?")
                .bind(row.is_done)
                .bind(row.id)
                .bind(auth.user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!(error = %e, assignment_id = row.id, "Failed to toggle assignment");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?;
        }
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit task transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Daily log saved"
    })))
}

/* =========================
Assign tasks for a day (manager)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/tasks/assign",
    request_body = AssignTasks,
    responses(
        (status = 200, description = "Assignments replaced"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn assign_tasks(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AssignTasks>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let user_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ? LIMIT 1)",
    )
    .bind(payload.user_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to check user");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if !user_exists {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "User not found"
        })));
    }

    // delete + recreate in one transaction so readers never observe an
    // empty assignment set mid-update
    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to begin assign transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query(
        r#"
        INSERT INTO tasks (user_id, date, content, manager_comment)
        VALUES (?, ?, '', ?)
        ON DUPLICATE KEY UPDATE manager_comment = VALUES(manager_comment)
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.date)
    .bind(&payload.manager_comment)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, user_id = payload.user_id, "Failed to upsert manager comment");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("DELETE FROM assigned_tasks WHERE user_id = ? AND date = ?")
        .bind(payload.user_id)
        .bind(payload.date)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = payload.user_id, "Failed to clear assignments");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    for item in &payload.assigned_tasks {
        sqlx::query(
            r#"
            INSERT INTO assigned_tasks (user_id, date, company_name, task_title, is_done)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(payload.user_id)
        .bind(payload.date)
        .bind(&item.company_name)
        .bind(&item.task_title)
        .bind(item.is_done)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = payload.user_id, "Failed to insert assignment");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit assign transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Assignments replaced",
        "count": payload.assigned_tasks.len()
    })))
}

/* =========================
Monthly {user, leaves, tasks} groupings
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    params(MonthQuery),
    responses(
        (status = 200, description = "Per-user monthly groupings", body = [UserMonthGroup]),
        (status = 400, description = "Invalid month"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn month_tasks(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
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

    let mut groups = Vec::with_capacity(users.len());
    for user in users {
        let leaves = fetch_month_leaves(pool.get_ref(), user.id, first, last).await?;
        let tasks = fetch_month_tasks(pool.get_ref(), user.id, first, last).await?;
        let assignments = fetch_month_assignments(pool.get_ref(), user.id, first, last).await?;

        let tasks = tasks
            .into_iter()
            .map(|task| {
                let assigned_tasks = assignments
                    .iter()
                    .filter(|a| a.date == task.date)
                    .cloned()
                    .collect();
                TaskWithAssignments {
                    task,
                    assigned_tasks,
                }
            })
            .collect();

        groups.push(UserMonthGroup {
            user,
            leaves,
            tasks,
        });
    }

    Ok(HttpResponse::Ok().json(groups))
}

/// Who the caller may look at: managers pick anyone (or everyone), employees
/// are pinned to themselves.
pub fn user_scope(auth: &AuthUser, requested: Option<u64>) -> Result<Option<u64>, HttpResponse> {
    if auth.is_manager() {
        return Ok(requested);
    }
    match requested {
        Some(id) if id != auth.user_id => Err(HttpResponse::Forbidden().json(
            serde_json::json!({"message": "Employees can only view their own records"}),
        )),
        _ => Ok(Some(auth.user_id)),
    }
}

pub async fn fetch_users(
    pool: &MySqlPool,
    scope: Option<u64>,
    month_start: NaiveDate,
) -> actix_web::Result<Vec<UserSummary>> {
    // offboarded users disappear from months after their end_date
    let mut sql = String::from(
        "SELECT id, name, email, role_id FROM users \
         WHERE (end_date IS NULL OR end_date >= ?)",
    );
    if scope.is_some() {
        sql.push_str(" AND id = ?");
    }
    sql.push_str(" ORDER BY name");

    let mut q = sqlx::query_as::<_, UserSummary>(&sql).bind(month_start);
    if let Some(id) = scope {
        q = q.bind(id);
    }

    q.fetch_all(pool).await.map_err(|e| {
        error!(error = %e, "Failed to fetch users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

pub async fn fetch_month_leaves(
    pool: &MySqlPool,
    user_id: u64,
    first: NaiveDate,
    last: NaiveDate,
) -> actix_web::Result<Vec<Leave>> {
    sqlx::query_as::<_, Leave>(
        r#"
        SELECT id, user_id, start_date, end_date, leave_type, status, reason, days,
               start_time, end_time, manager_comment, is_edited, created_at, updated_at
        FROM leaves
        WHERE user_id = ? AND start_date <= ? AND end_date >= ?
        ORDER BY start_date
        "#,
    )
    .bind(user_id)
    .bind(last)
    .bind(first)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch month leaves");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

pub async fn fetch_month_tasks(
    pool: &MySqlPool,
    user_id: u64,
    first: NaiveDate,
    last: NaiveDate,
) -> actix_web::Result<Vec<Task>> {
    sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, date, content, manager_comment, status, created_at, updated_at
        FROM tasks
        WHERE user_id = ? AND date BETWEEN ? AND ?
        ORDER BY date
        "#,
    )
    .bind(user_id)
    .bind(first)
    .bind(last)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch month tasks");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

async fn fetch_month_assignments(
    pool: &MySqlPool,
    user_id: u64,
    first: NaiveDate,
    last: NaiveDate,
) -> actix_web::Result<Vec<AssignedTask>> {
    sqlx::query_as::<_, AssignedTask>(
        r#"
        SELECT id, user_id, date, company_name, task_title, is_done, created_at
        FROM assigned_tasks
        WHERE user_id = ? AND date BETWEEN ? AND ?
        ORDER BY date, id
        "#,
    )
    .bind(user_id)
    .bind(first)
    .bind(last)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch month assignments");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}
