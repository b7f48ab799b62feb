use axum::{Json, debug_handler, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, auth::AuthUser};

use super::format::{NO_MESSAGES, snippet, time_ago};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateChatBody {
    friend_id: Option<Uuid>,
}

#[debug_handler]
pub(crate) async fn create_chat(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
    Json(CreateChatBody { friend_id }): Json<CreateChatBody>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(friend_id) = friend_id else {
        return Err(AppError::bad_request("friend_id is required"));
    };

    let chat_id = find_or_create_chat(&db_pool, user.id, friend_id).await?;
    Ok(Json(json!({ "chat_id": chat_id })))
}

/// Two users share at most one chat. The unordered participant pair is a
/// unique key on the chat row, so concurrent calls for the same pair
/// converge on one chat instead of racing a check-then-insert; running
/// inside a transaction also rules out a chat without its participants.
pub async fn find_or_create_chat(
    db_pool: &SqlitePool,
    me: Uuid,
    friend_id: Uuid,
) -> AppResult<Uuid> {
    if friend_id == me {
        return Err(AppError::bad_request("invalid target: cannot chat with yourself"));
    }

    let key = pair_key(me, friend_id);
    let mut tx = db_pool.begin().await?;

    sqlx::query(
        "INSERT INTO chats (id,pair_key,created_at) VALUES (?,?,?)
         ON CONFLICT(pair_key) DO NOTHING",
    )
    .bind(Uuid::now_v7())
    .bind(&key)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    let (chat_id,): (Uuid,) = sqlx::query_as("SELECT id FROM chats WHERE pair_key=?")
        .bind(&key)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query("INSERT OR IGNORE INTO chat_participants (chat_id,user_id) VALUES (?,?),(?,?)")
        .bind(chat_id)
        .bind(me)
        .bind(chat_id)
        .bind(friend_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(chat_id)
}

fn pair_key(a: Uuid, b: Uuid) -> String {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    format!("{lo}:{hi}")
}

#[derive(Debug, Serialize)]
pub struct ChatSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub avatar_url: String,
    pub snippet: String,
    pub time: String,
    pub online: bool,
    pub profile: ProfileSnippet,
}

#[derive(Debug, Serialize)]
pub struct ProfileSnippet {
    pub username: String,
    pub bio: String,
}

#[debug_handler]
pub(crate) async fn chats_index(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
) -> AppResult<Json<Vec<ChatSummary>>> {
    Ok(Json(list_chats(&db_pool, user.id).await?))
}

/// Chat summaries for the chat list, most recently active first; chats
/// without messages fall back to their creation time for ordering.
pub async fn list_chats(db_pool: &SqlitePool, me: Uuid) -> AppResult<Vec<ChatSummary>> {
    let rows: Vec<(
        Uuid,
        Option<String>,
        Option<String>,
        Option<String>,
        Option<String>,
    )> = sqlx::query_as(
        "SELECT c.id, p.full_name, p.username, p.avatar_url, p.bio
         FROM chats c
         JOIN chat_participants mine ON mine.chat_id = c.id AND mine.user_id = ?
         JOIN chat_participants other ON other.chat_id = c.id AND other.user_id != ?
         LEFT JOIN profiles p ON p.id = other.user_id
         ORDER BY COALESCE(c.last_message_at, c.created_at) DESC",
    )
    .bind(me)
    .bind(me)
    .fetch_all(db_pool)
    .await?;

    let now = Utc::now();
    let mut chats = Vec::with_capacity(rows.len());
    for (chat_id, full_name, username, avatar_url, bio) in rows {
        let latest: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT content, created_at FROM messages
             WHERE chat_id=? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(chat_id)
        .fetch_optional(db_pool)
        .await?;

        let (preview, time) = match &latest {
            Some((content, created_at)) => (snippet(content), time_ago(*created_at, now)),
            None => (NO_MESSAGES.to_owned(), NO_MESSAGES.to_owned()),
        };

        let username = username.unwrap_or_else(|| "unknown".to_owned());
        chats.push(ChatSummary {
            id: chat_id,
            name: full_name.unwrap_or_else(|| "Unknown".to_owned()),
            username: username.clone(),
            avatar_url: avatar_url.unwrap_or_default(),
            snippet: preview,
            time,
            // presence is stubbed
            online: false,
            profile: ProfileSnippet {
                username,
                bio: bio.unwrap_or_default(),
            },
        });
    }

    Ok(chats)
}
