mod login;
mod logout;
mod me;
mod register;

use axum::{
    Router,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
};
use chrono::Utc;
use rand::Rng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
        .route("/logout", post(logout::logout))
        .route("/me", get(me::me))
}

/// Verified caller identity. Every request resolves its bearer token
/// against the sessions table; nothing is cached in-process.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthenticated("missing bearer token"))?
            .to_owned();

        let db_pool = SqlitePool::from_ref(state);
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM sessions WHERE token=?")
            .bind(&token)
            .fetch_optional(&db_pool)
            .await?;

        let (id,) = row.ok_or(AppError::Unauthenticated("invalid or expired token"))?;
        Ok(AuthUser { id, token })
    }
}

pub(crate) async fn mint_session(db_pool: &SqlitePool, user_id: Uuid) -> AppResult<String> {
    let bytes: [u8; 32] = rand::rng().random();
    let token: String = bytes.iter().map(|b| format!("{b:02x}")).collect();

    sqlx::query("INSERT INTO sessions (token,user_id,created_at) VALUES (?,?,?)")
        .bind(&token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(db_pool)
        .await?;

    Ok(token)
}
