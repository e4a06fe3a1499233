use crate::auth::auth::AuthUser;
use crate::core::dates::{edit_deadline, inclusive_days};
use crate::core::split::{SplitError, plan_split};
use crate::mailer::{OutgoingMail, SharedMailer, send_best_effort};
use crate::model::leave::{Leave, LeaveStatus, LeaveType};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "full")]
    pub leave_type: LeaveType,
    #[schema(example = "Family emergency")]
    pub reason: String,
    #[schema(example = "10:00:00", value_type = String, nullable = true)]
    pub start_time: Option<NaiveTime>,
    #[schema(example = "14:00:00", value_type = String, nullable = true)]
    pub end_time: Option<NaiveTime>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by user ID (manager only)
    #[schema(example = 123)]
    pub user_id: Option<u64>,
    /// Filter by leave status
    #[schema(example = "pending")]
    pub status: Option<LeaveStatus>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

#[derive(Deserialize, ToSchema)]
pub struct DecideLeave {
    #[schema(example = "Approved, plan handover", nullable = true)]
    pub comment: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SplitLeave {
    #[schema(example = "2025-06-12", format = "date", value_type = String)]
    pub target_date: NaiveDate,
    #[schema(example = "half")]
    pub new_type: LeaveType,
    #[schema(example = "approved")]
    pub new_status: LeaveStatus,
    #[schema(example = "Half day approved for the clinic visit", nullable = true)]
    pub comment: Option<String>,
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted",
            "status": "pending"
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    if payload.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "reason must not be empty"
        })));
    }

    let days = inclusive_days(payload.start_date, payload.end_date);

    sqlx::query(
        r#"
        INSERT INTO leaves
            (user_id, start_date, end_date, leave_type, status, reason, days, start_time, end_time)
        VALUES (?, ?, ?, ?, 'pending', ?, ?, ?, ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type)
    .bind(payload.reason.trim())
    .bind(days)
    .bind(payload.start_time)
    .bind(payload.end_time)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

/* =========================
List leaves
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    // Employees only ever see their own requests.
    let user_filter = if auth.is_manager() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    if let Some(user_id) = user_filter {
        where_sql.push_str(" AND user_id = ?");
        args.push(FilterValue::U64(user_id));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.to_string()));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leaves{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(s.clone()),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count leaves");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, user_id, start_date, end_date, leave_type, status, reason, days,
               start_time, end_time, manager_comment, is_edited, created_at, updated_at
        FROM leaves
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Leave>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "data": leaves,
        "page": page,
        "per_page": per_page,
        "total": total
    })))
}

/* =========================
Get one leave
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "Leave ID")),
    responses(
        (status = 200, description = "Leave found", body = Leave),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = fetch_leave(pool.get_ref(), leave_id).await?;

    match leave {
        Some(l) if auth.is_manager() || l.user_id == auth.user_id => {
            Ok(HttpResponse::Ok().json(l))
        }
        Some(_) => Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "message": "Not your leave request"
        }))),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/* =========================
Re-edit own pending leave (inside the edit window)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "Leave ID")),
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave updated"),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Edit window closed or not the owner"),
        (status = 404, description = "Leave not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let leave = match fetch_leave(pool.get_ref(), leave_id).await? {
        Some(l) => l,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Leave request not found"
            })));
        }
    };

    if leave.user_id != auth.user_id {
        return Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "message": "Not your leave request"
        })));
    }

    if leave.status != LeaveStatus::Pending {
        return Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "message": "Only pending requests can be edited"
        })));
    }

    let created_at = leave.created_at.unwrap_or_else(Utc::now);
    if Utc::now() > edit_deadline(created_at) {
        return Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "message": "Edit window has closed"
        })));
    }

    let days = inclusive_days(payload.start_date, payload.end_date);

    sqlx::query(
        r#"
        UPDATE leaves
        SET start_date = ?, end_date = ?, leave_type = ?, reason = ?, days = ?,
            start_time = ?, end_time = ?, is_edited = TRUE
        WHERE id = ?
        "#,
    )
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type)
    .bind(payload.reason.trim())
    .bind(days)
    .bind(payload.start_time)
    .bind(payload.end_time)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to update leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request updated"
    })))
}

/* =========================
Approve / reject (manager)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "Leave ID")),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Leave approved"),
        (status = 400, description = "Leave not found or already processed"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<SharedMailer>,
    path: web::Path<u64>,
    payload: web::Json<DecideLeave>,
) -> actix_web::Result<impl Responder> {
    decide_leave(
        auth,
        pool,
        mailer,
        path.into_inner(),
        LeaveStatus::Approved,
        payload.comment.clone(),
    )
    .await
}

#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "Leave ID")),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Leave rejected"),
        (status = 400, description = "Leave not found or already processed"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<SharedMailer>,
    path: web::Path<u64>,
    payload: web::Json<DecideLeave>,
) -> actix_web::Result<impl Responder> {
    decide_leave(
        auth,
        pool,
        mailer,
        path.into_inner(),
        LeaveStatus::Rejected,
        payload.comment.clone(),
    )
    .await
}

async fn decide_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<SharedMailer>,
    leave_id: u64,
    decision: LeaveStatus,
    comment: Option<String>,
) -> actix_web::Result<HttpResponse> {
    auth.require_manager()?;

    let result = sqlx::query(
        r#"
        UPDATE leaves
        SET status = ?, manager_comment = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(decision)
    .bind(&comment)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Leave decision failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    // notification is best-effort; a mail failure never fails the decision
    let recipient = sqlx::query_as::<_, (String, NaiveDate, NaiveDate)>(
        r#"
        SELECT u.email, l.start_date, l.end_date
        FROM leaves l
        JOIN users u ON u.id = l.user_id
        WHERE l.id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await;

    match recipient {
        Ok(Some((email, start, end))) => {
            send_best_effort(
                mailer.get_ref(),
                OutgoingMail {
                    to: email,
                    subject: format!("Your leave request was {decision}"),
                    body: format!(
                        "Your leave from {start} to {end} has been {decision}.{}",
                        comment
                            .as_deref()
                            .map(|c| format!(" Manager comment: {c}"))
                            .unwrap_or_default()
                    ),
                },
            );
        }
        Ok(None) => {}
        Err(e) => error!(error = %e, leave_id, "Failed to load decision mail recipient"),
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave {decision}")
    })))
}

/* =========================
Split one day out of a leave (manager)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave/{leave_id}/split",
    params(("leave_id" = u64, Path, description = "Leave ID")),
    request_body = SplitLeave,
    responses(
        (status = 200, description = "Leave split into segments", body = Object, example = json!({
            "message": "Leave split",
            "segments": 3
        })),
        (status = 400, description = "Target date outside the leave range"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn split_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<SplitLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let leave_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, leave_id, "Failed to begin split transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let leave = sqlx::query_as::<_, Leave>(
        r#"
        SELECT id, user_id, start_date, end_date, leave_type, status, reason, days,
               start_time, end_time, manager_comment, is_edited, created_at, updated_at
        FROM leaves
        WHERE id = ?
        FOR UPDATE
        "#,
    )
    .bind(leave_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to fetch leave for split");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let leave = match leave {
        Some(l) => l,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Leave request not found"
            })));
        }
    };

    // validated before any row is touched; the transaction has not written yet
    let plan = match plan_split(leave.start_date, leave.end_date, payload.target_date) {
        Ok(p) => p,
        Err(SplitError::TargetOutOfRange) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "target_date is outside the leave's date range"
            })));
        }
    };

    // flank segments inherit the original record's fields verbatim
    for segment in [plan.before, plan.after].into_iter().flatten() {
        sqlx::query(
            r#"
            INSERT INTO leaves
                (user_id, start_date, end_date, leave_type, status, reason, days,
                 start_time, end_time, manager_comment, is_edited)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(leave.user_id)
        .bind(segment.start_date)
        .bind(segment.end_date)
        .bind(leave.leave_type)
        .bind(leave.status)
        .bind(&leave.reason)
        .bind(segment.days)
        .bind(leave.start_time)
        .bind(leave.end_time)
        .bind(&leave.manager_comment)
        .bind(leave.is_edited)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, leave_id, "Failed to insert flank segment");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    }

    // target day takes the manager's override
    sqlx::query(
        r#"
        INSERT INTO leaves
            (user_id, start_date, end_date, leave_type, status, reason, days,
             start_time, end_time, manager_comment, is_edited)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(leave.user_id)
    .bind(plan.target.start_date)
    .bind(plan.target.end_date)
    .bind(payload.new_type)
    .bind(payload.new_status)
    .bind(&leave.reason)
    .bind(plan.target.days)
    .bind(leave.start_time)
    .bind(leave.end_time)
    .bind(&payload.comment)
    .bind(leave.is_edited)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to insert target segment");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("DELETE FROM leaves WHERE id = ?")
        .bind(leave_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, leave_id, "Failed to delete original leave");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, leave_id, "Failed to commit split transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    info!(
        leave_id,
        target = %payload.target_date,
        segments = plan.segment_count(),
        "Leave split"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave split",
        "segments": plan.segment_count()
    })))
}

async fn fetch_leave(pool: &MySqlPool, leave_id: u64) -> actix_web::Result<Option<Leave>> {
    sqlx::query_as::<_, Leave>(
        r#"
        SELECT id, user_id, start_date, end_date, leave_type, status, reason, days,
               start_time, end_time, manager_comment, is_edited, created_at, updated_at
        FROM leaves
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}
