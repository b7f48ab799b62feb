use axum::{Json, debug_handler, extract::State};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    AppResult,
    auth::AuthUser,
    db::{self, Friendship, Profile},
};

/// Accepted friendship flattened to the other user's profile.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub(crate) struct FriendEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    profile: Profile,
    friendship_id: Uuid,
}

#[debug_handler]
pub(crate) async fn friends_index(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
) -> AppResult<Json<Vec<FriendEntry>>> {
    let friends: Vec<FriendEntry> = sqlx::query_as(
        "SELECT p.id, p.username, p.full_name, p.bio, p.avatar_url,
                p.created_at, p.updated_at, f.id AS friendship_id
         FROM friendships f
         JOIN profiles p
           ON p.id = CASE WHEN f.user_id = ? THEN f.friend_id ELSE f.user_id END
         WHERE (f.user_id = ? OR f.friend_id = ?) AND f.status = 'accepted'
         ORDER BY p.username",
    )
    .bind(user.id)
    .bind(user.id)
    .bind(user.id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(friends))
}

#[derive(Debug, Serialize)]
pub(crate) struct PendingRequest {
    #[serde(flatten)]
    friendship: Friendship,
    user: Profile,
}

/// Pending requests targeting the caller, with the requester's profile.
#[debug_handler]
pub(crate) async fn pending_index(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
) -> AppResult<Json<Vec<PendingRequest>>> {
    let friendships: Vec<Friendship> = sqlx::query_as(
        "SELECT id,user_id,friend_id,status,created_at
         FROM friendships
         WHERE friend_id = ? AND status = 'pending'
         ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&db_pool)
    .await?;

    let mut requests = Vec::with_capacity(friendships.len());
    for friendship in friendships {
        let requester = db::fetch_profile(&db_pool, friendship.user_id).await?;
        requests.push(PendingRequest {
            friendship,
            user: requester,
        });
    }

    Ok(Json(requests))
}
