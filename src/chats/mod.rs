mod feed;
mod format;
mod resolve;

pub use feed::{FeedMessage, Sender, Who, list_messages, send_message};
pub use format::{snippet, time_ago};
pub use resolve::{ChatSummary, ProfileSnippet, find_or_create_chat, list_chats};

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(resolve::create_chat).get(resolve::chats_index))
        .route(
            "/{chat_id}/messages",
            get(feed::messages_index).post(feed::send),
        )
}

/// Gate for every message read/write: the caller must hold a participant
/// row. Nonexistent chats fail the same way as foreign ones.
pub async fn assert_membership(
    db_pool: &SqlitePool,
    chat_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    sqlx::query_as::<_, ()>("SELECT 1 FROM chat_participants WHERE chat_id=? AND user_id=?")
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::Forbidden("no access to this chat"))
}
