use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    mailer::{OutgoingMail, SharedMailer, send_best_effort},
    model::role::Role,
    models::{LoginReqDto, RegisterReqDto, TokenType, UserSql},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

async fn email_taken(email: &str, pool: &MySqlPool) -> bool {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? LIMIT 1)")
        .bind(email)
        .fetch_one(pool)
        .await
        .unwrap_or(true) // fail-safe
}

/// User registration handler. New accounts start as plain employees; a
/// manager promotes them afterwards.
pub async fn register(
    user: web::Json<RegisterReqDto>,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<SharedMailer>,
) -> impl Responder {
    let name = user.name.trim();
    let email = user.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || user.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Name, email and password must not be empty"
        }));
    }

    if email_taken(&email, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Email already registered"
        }));
    }

    let hashed = hash_password(&user.password);

    let result = sqlx::query(
        r#"INSERT INTO users (name, email, password, role_id) VALUES (?, ?, ?, ?)"#,
    )
    .bind(name)
    .bind(&email)
    .bind(&hashed)
    .bind(Role::Employee.id())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            send_best_effort(
                mailer.get_ref(),
                OutgoingMail {
                    to: email,
                    subject: "Welcome aboard".to_string(),
                    body: format!("Hi {name}, your account has been created."),
                },
            );
            HttpResponse::Created().json(json!({
                "message": "User registered successfully"
            }))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return HttpResponse::Conflict().json(json!({
                        "error": "Email already registered"
                    }));
                }
            }
            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }))
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, name, email, password, role_id
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(user.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return Ok(HttpResponse::Unauthorized().body("No token")),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return Ok(HttpResponse::Unauthorized().body("Invalid token")),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return Ok(HttpResponse::Unauthorized().finish()),
    };

    if claims.token_type != TokenType::Refresh {
        return Ok(HttpResponse::Unauthorized().finish());
    }

    let record = sqlx::query_as::<_, (u64, u64, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to look up refresh token");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (record_id, record_user_id) = match record {
        Some((id, user_id, revoked)) if !revoked => (id, user_id),
        _ => return Ok(HttpResponse::Unauthorized().finish()),
    };

    // rotate: revoke old, issue new
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to revoke refresh token");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record_user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to store rotated refresh token");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    Ok(HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    })))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // revoke refresh token (idempotent)
    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}

#[derive(Deserialize)]
pub struct ForgotPasswordReq {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordReq {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Issue a one-time password-reset code. Any previous code for the email is
/// purged so exactly one code is live at a time.
pub async fn forgot_password(
    body: web::Json<ForgotPasswordReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    mailer: web::Data<SharedMailer>,
) -> actix_web::Result<impl Responder> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "Email required"})));
    }

    if !email_taken(&email, pool.get_ref()).await {
        return Ok(HttpResponse::NotFound().json(json!({"message": "No account for that email"})));
    }

    let code = format!("{:06}", OsRng.next_u32() % 1_000_000);
    let expires_at = Utc::now() + Duration::seconds(config.otp_ttl_secs);

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to begin OTP transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("DELETE FROM otps WHERE email = ?")
        .bind(&email)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to purge old OTP codes");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    sqlx::query("INSERT INTO otps (email, code, expires_at) VALUES (?, ?, ?)")
        .bind(&email)
        .bind(&code)
        .bind(expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to store OTP code");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit OTP transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    send_best_effort(
        mailer.get_ref(),
        OutgoingMail {
            to: email,
            subject: "Your password reset code".to_string(),
            body: format!("Your one-time code is {code}. It expires in 10 minutes."),
        },
    );

    Ok(HttpResponse::Ok().json(json!({"message": "Reset code sent"})))
}

/// Verify the one-time code and set the new password.
pub async fn reset_password(
    body: web::Json<ResetPasswordReq>,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.code.is_empty() || body.new_password.is_empty() {
        return Ok(HttpResponse::BadRequest()
            .json(json!({"error": "Email, code and new_password required"})));
    }

    let row = sqlx::query_as::<_, (String, DateTime<Utc>)>(
        "SELECT code, expires_at FROM otps WHERE email = ?",
    )
    .bind(&email)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to look up OTP code");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let valid = matches!(
        &row,
        Some((code, expires_at)) if *code == body.code && *expires_at > Utc::now()
    );
    if !valid {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "Invalid or expired code"})));
    }

    let hashed = hash_password(&body.new_password);

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to begin reset transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("UPDATE users SET password = ? WHERE email = ?")
        .bind(&hashed)
        .bind(&email)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update password");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    sqlx::query("DELETE FROM otps WHERE email = ?")
        .bind(&email)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to consume OTP code");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit reset transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({"message": "Password updated"})))
}
