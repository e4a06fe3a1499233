use crate::auth::auth::AuthUser;
use crate::model::role::Role;
use crate::model::user::User;
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub role_id: Option<u8>,
    /// Search by name or email
    pub search: Option<String>,
}

/// Manager-editable user fields. Omitted fields are left untouched.
#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    #[schema(example = "Jane Doe", nullable = true)]
    pub name: Option<String>,
    /// 1 = manager, 2 = employee
    #[schema(example = 2, nullable = true)]
    pub role_id: Option<u8>,
    #[schema(example = "2026-01-01", format = "date", value_type = String, nullable = true)]
    pub end_date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated user list"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // Helper enum for typed SQLx binding
    enum FilterValue {
        U8(u8),
        Str(String),
    }

    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(role_id) = query.role_id {
        conditions.push("role_id = ?");
        bindings.push(FilterValue::U8(role_id));
    }

    if let Some(search) = &query.search {
        conditions.push("(name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(FilterValue::Str(like.clone()));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::U8(v) => count_query.bind(*v),
            FilterValue::Str(s) => count_query.bind(s.clone()),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count users");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT id, name, email, password, role_id, end_date, created_at \
         FROM users {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, User>(&data_sql);
    for b in bindings {
        data_query = match b {
            FilterValue::U8(v) => data_query.bind(v),
            FilterValue::Str(s) => data_query.bind(s),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let users = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch users");
        actix_web::error::ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "data": users,
        "page": page,
        "per_page": per_page,
        "total": total
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{user_id}",
    params(("user_id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let user_id = path.into_inner();

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, password, role_id, end_date, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch user");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(u)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        }))),
    }
}

/// Manager updates name, role or offboarding date. Accounts are never hard
/// deleted; offboarding sets end_date instead.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{user_id}",
    params(("user_id" = u64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Bad request"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateUser>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let user_id = path.into_inner();

    let mut fields: Vec<(&str, SqlValue)> = Vec::new();

    if let Some(name) = &body.name {
        if name.trim().is_empty() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "name must not be empty"
            })));
        }
        fields.push(("name", SqlValue::String(name.trim().to_string())));
    }

    if let Some(role_id) = body.role_id {
        if Role::from_id(role_id).is_none() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Invalid role_id"
            })));
        }
        fields.push(("role_id", SqlValue::I64(role_id as i64)));
    }

    if let Some(end_date) = body.end_date {
        fields.push(("end_date", SqlValue::Date(end_date)));
    }

    let update = build_update_sql("users", fields, "id", user_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "Failed to update user");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "User updated successfully"
    })))
}
