use axum::{
    Json, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, auth::AuthUser};

use super::{assert_membership, format::time_ago};

const DEFAULT_PAGE: u32 = 50;
const MAX_PAGE: u32 = 200;

/// Perspective label relative to the requesting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Who {
    Me,
    Them,
}

#[derive(Debug, Serialize)]
pub struct FeedMessage {
    pub id: Uuid,
    pub who: Who,
    pub text: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct Sender {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub avatar_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    limit: Option<u32>,
    before: Option<String>,
}

#[debug_handler]
pub(crate) async fn messages_index(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
    Path(chat_id): Path<Uuid>,
    Query(PageQuery { limit, before }): Query<PageQuery>,
) -> AppResult<Json<Vec<FeedMessage>>> {
    assert_membership(&db_pool, chat_id, user.id).await?;

    let before = match before {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(&raw)
                .map_err(|_| AppError::bad_request("invalid before timestamp"))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let page = list_messages(&db_pool, chat_id, user.id, limit, before).await?;
    Ok(Json(page))
}

type MessageRow = (
    Uuid,
    Uuid,
    String,
    DateTime<Utc>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// One page of a chat's history. Fetched newest-first (optionally strictly
/// before the cursor), then reversed so the wire order is chronological.
pub async fn list_messages(
    db_pool: &SqlitePool,
    chat_id: Uuid,
    me: Uuid,
    limit: Option<u32>,
    before: Option<DateTime<Utc>>,
) -> AppResult<Vec<FeedMessage>> {
    let limit = limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);

    let mut rows: Vec<MessageRow> = match before {
        Some(cursor) => {
            sqlx::query_as(
                "SELECT m.id, m.sender_id, m.content, m.created_at,
                        p.full_name, p.username, p.avatar_url
                 FROM messages m
                 LEFT JOIN profiles p ON p.id = m.sender_id
                 WHERE m.chat_id=? AND m.created_at < ?
                 ORDER BY m.created_at DESC, m.id DESC
                 LIMIT ?",
            )
            .bind(chat_id)
            .bind(cursor)
            .bind(limit)
            .fetch_all(db_pool)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT m.id, m.sender_id, m.content, m.created_at,
                        p.full_name, p.username, p.avatar_url
                 FROM messages m
                 LEFT JOIN profiles p ON p.id = m.sender_id
                 WHERE m.chat_id=?
                 ORDER BY m.created_at DESC, m.id DESC
                 LIMIT ?",
            )
            .bind(chat_id)
            .bind(limit)
            .fetch_all(db_pool)
            .await?
        }
    };

    rows.reverse();

    let now = Utc::now();
    Ok(rows
        .into_iter()
        .map(
            |(id, sender_id, content, created_at, full_name, username, avatar_url)| FeedMessage {
                id,
                who: if sender_id == me { Who::Me } else { Who::Them },
                text: content,
                sender: Sender {
                    id: sender_id,
                    name: full_name.unwrap_or_else(|| "Unknown".to_owned()),
                    username: username.unwrap_or_else(|| "unknown".to_owned()),
                    avatar_url: avatar_url.unwrap_or_default(),
                },
                created_at,
                time: time_ago(created_at, now),
            },
        )
        .collect())
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendBody {
    content: Option<String>,
}

#[debug_handler]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
    Path(chat_id): Path<Uuid>,
    Json(SendBody { content }): Json<SendBody>,
) -> AppResult<(StatusCode, Json<FeedMessage>)> {
    // validation comes first: a blank message is a 400 even for a non-member
    let content = content.as_deref().unwrap_or_default();
    if content.trim().is_empty() {
        return Err(AppError::bad_request("message cannot be empty"));
    }

    assert_membership(&db_pool, chat_id, user.id).await?;

    let message = send_message(&db_pool, chat_id, user.id, content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Appends one immutable message and advances the chat's ordering key in
/// the same transaction, so the chat list reflects it immediately.
pub async fn send_message(
    db_pool: &SqlitePool,
    chat_id: Uuid,
    me: Uuid,
    content: &str,
) -> AppResult<FeedMessage> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("message cannot be empty"));
    }

    let id = Uuid::now_v7();
    let created_at = Utc::now();

    let mut tx = db_pool.begin().await?;
    sqlx::query("INSERT INTO messages (id,chat_id,sender_id,content,created_at) VALUES (?,?,?,?,?)")
        .bind(id)
        .bind(chat_id)
        .bind(me)
        .bind(content)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE chats SET last_message_at=? WHERE id=?")
        .bind(created_at)
        .bind(chat_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    let (full_name, username, avatar_url): (String, String, String) =
        sqlx::query_as("SELECT full_name, username, avatar_url FROM profiles WHERE id=?")
            .bind(me)
            .fetch_one(db_pool)
            .await?;

    Ok(FeedMessage {
        id,
        who: Who::Me,
        text: content.to_owned(),
        sender: Sender {
            id: me,
            name: full_name,
            username,
            avatar_url,
        },
        created_at,
        time: time_ago(created_at, created_at),
    })
}
