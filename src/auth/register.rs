use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::{Json, debug_handler, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, db};

use super::mint_session;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterBody {
    email: Option<String>,
    password: Option<String>,
    username: Option<String>,
    full_name: Option<String>,
    bio: Option<String>,
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    Json(body): Json<RegisterBody>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let (Some(email), Some(password), Some(username)) = (body.email, body.password, body.username)
    else {
        return Err(AppError::bad_request(
            "email, password and username are required",
        ));
    };
    if email.trim().is_empty() || password.is_empty() || username.trim().is_empty() {
        return Err(AppError::bad_request(
            "email, password and username are required",
        ));
    }

    // username uniqueness is checked before the account is touched
    let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM profiles WHERE username=?")
        .bind(&username)
        .fetch_optional(&db_pool)
        .await?;
    if taken.is_some() {
        return Err(AppError::bad_request("username is already taken"));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email=?")
        .bind(&email)
        .fetch_optional(&db_pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::bad_request("email is already registered"));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("password hashing failed: {err}"))?
        .to_string();

    let user_id = Uuid::now_v7();
    let now = Utc::now();
    let full_name = body
        .full_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| username.clone());
    let bio = body.bio.unwrap_or_default();

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO users (id,email,password_hash,created_at) VALUES (?,?,?,?)")
        .bind(user_id)
        .bind(&email)
        .bind(&password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "INSERT INTO profiles (id,username,full_name,bio,avatar_url,created_at,updated_at)
         VALUES (?,?,?,?,'',?,?)",
    )
    .bind(user_id)
    .bind(&username)
    .bind(&full_name)
    .bind(&bio)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    let profile = db::fetch_profile(&db_pool, user_id).await?;
    let access_token = mint_session(&db_pool, user_id).await?;
    tracing::info!(%user_id, %username, "registered new user");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": { "id": user_id, "email": email },
            "profile": profile,
            "access_token": access_token,
        })),
    ))
}
