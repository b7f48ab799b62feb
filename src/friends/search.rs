use axum::{
    Json, debug_handler,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppResult, auth::AuthUser, db::Profile};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    profile: Profile,
    friendship_status: Option<String>,
    friendship_id: Option<Uuid>,
}

/// Substring match on username or full name, excluding the caller,
/// capped at 20 hits. Queries shorter than 2 chars return nothing.
#[debug_handler]
pub async fn search_users(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Json<Vec<SearchHit>>> {
    let q = q.unwrap_or_default();
    let q = q.trim();
    if q.chars().count() < 2 {
        return Ok(Json(Vec::new()));
    }

    let pattern = format!("%{q}%");
    let profiles: Vec<Profile> = sqlx::query_as(
        "SELECT id,username,full_name,bio,avatar_url,created_at,updated_at
         FROM profiles
         WHERE id != ? AND (username LIKE ? OR full_name LIKE ?)
         ORDER BY username
         LIMIT 20",
    )
    .bind(user.id)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(&db_pool)
    .await?;

    let mut hits = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let edge: Option<(Uuid, String)> = sqlx::query_as(
            "SELECT id,status FROM friendships
             WHERE (user_id = ? AND friend_id = ?) OR (user_id = ? AND friend_id = ?)",
        )
        .bind(user.id)
        .bind(profile.id)
        .bind(profile.id)
        .bind(user.id)
        .fetch_optional(&db_pool)
        .await?;

        let (friendship_id, friendship_status) = match edge {
            Some((id, status)) => (Some(id), Some(status)),
            None => (None, None),
        };
        hits.push(SearchHit {
            profile,
            friendship_status,
            friendship_id,
        });
    }

    Ok(Json(hits))
}
