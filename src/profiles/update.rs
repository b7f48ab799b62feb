use axum::{Json, debug_handler, extract::State};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{AppResult, auth::AuthUser, db::Profile};

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateBody {
    full_name: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[debug_handler]
pub(crate) async fn update_profile(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
    Json(body): Json<UpdateBody>,
) -> AppResult<Json<Profile>> {
    let profile: Profile = sqlx::query_as(
        "UPDATE profiles SET
            full_name  = COALESCE(?, full_name),
            bio        = COALESCE(?, bio),
            avatar_url = COALESCE(?, avatar_url),
            updated_at = ?
         WHERE id = ?
         RETURNING id,username,full_name,bio,avatar_url,created_at,updated_at",
    )
    .bind(body.full_name)
    .bind(body.bio)
    .bind(body.avatar_url)
    .bind(Utc::now())
    .bind(user.id)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(profile))
}
