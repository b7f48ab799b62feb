use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, auth::AuthUser, db::Friendship};

#[derive(Debug, Deserialize)]
pub(crate) struct RequestBody {
    friend_id: Option<Uuid>,
}

#[debug_handler]
pub(crate) async fn send_request(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
    Json(RequestBody { friend_id }): Json<RequestBody>,
) -> AppResult<Json<Friendship>> {
    let Some(friend_id) = friend_id else {
        return Err(AppError::bad_request("friend_id is required"));
    };
    if friend_id == user.id {
        return Err(AppError::bad_request("cannot befriend yourself"));
    }

    // at most one edge per unordered pair, whichever direction it was sent in
    let existing: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM friendships
         WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)",
    )
    .bind(user.id)
    .bind(friend_id)
    .bind(friend_id)
    .bind(user.id)
    .fetch_optional(&db_pool)
    .await?;
    if existing.is_some() {
        return Err(AppError::bad_request("friend request already exists"));
    }

    let friendship: Friendship = sqlx::query_as(
        "INSERT INTO friendships (id,user_id,friend_id,status,created_at)
         VALUES (?,?,?,'pending',?)
         RETURNING id,user_id,friend_id,status,created_at",
    )
    .bind(Uuid::now_v7())
    .bind(user.id)
    .bind(friend_id)
    .bind(Utc::now())
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(friendship))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AcceptBody {
    friendship_id: Option<Uuid>,
}

/// Only the target of a pending request may accept it.
#[debug_handler]
pub(crate) async fn accept_request(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
    Json(AcceptBody { friendship_id }): Json<AcceptBody>,
) -> AppResult<Json<Friendship>> {
    let Some(friendship_id) = friendship_id else {
        return Err(AppError::bad_request("friendship_id is required"));
    };

    let friendship: Option<Friendship> = sqlx::query_as(
        "UPDATE friendships SET status = 'accepted'
         WHERE id = ? AND friend_id = ? AND status = 'pending'
         RETURNING id,user_id,friend_id,status,created_at",
    )
    .bind(friendship_id)
    .bind(user.id)
    .fetch_optional(&db_pool)
    .await?;

    friendship
        .map(Json)
        .ok_or(AppError::NotFound("friend request not found"))
}

#[debug_handler]
pub(crate) async fn remove_friend(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
    Path(friendship_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = sqlx::query(
        "DELETE FROM friendships WHERE id = ? AND (user_id = ? OR friend_id = ?)",
    )
    .bind(friendship_id)
    .bind(user.id)
    .bind(user.id)
    .execute(&db_pool)
    .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("friendship not found"));
    }

    Ok(Json(json!({ "message": "friendship removed" })))
}
