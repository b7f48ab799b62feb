use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, db};

use super::mint_session;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginBody {
    email: Option<String>,
    password: Option<String>,
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<LoginBody>,
) -> AppResult<Json<serde_json::Value>> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(AppError::bad_request("email and password are required"));
    };

    let row: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id,password_hash FROM users WHERE email=?")
            .bind(&email)
            .fetch_optional(&db_pool)
            .await?;
    let Some((user_id, password_hash)) = row else {
        return Err(AppError::Unauthenticated("invalid email or password"));
    };

    let parsed = PasswordHash::new(&password_hash)
        .map_err(|err| anyhow::anyhow!("corrupt password hash: {err}"))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_err()
    {
        return Err(AppError::Unauthenticated("invalid email or password"));
    }

    let profile = db::fetch_profile(&db_pool, user_id).await?;
    let access_token = mint_session(&db_pool, user_id).await?;
    tracing::debug!(%user_id, "login");

    Ok(Json(json!({
        "access_token": access_token,
        "user": { "id": user_id, "email": email },
        "profile": profile,
    })))
}
