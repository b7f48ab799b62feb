use axum::{Json, debug_handler, extract::State};
use serde_json::json;
use sqlx::SqlitePool;

use crate::AppResult;

use super::AuthUser;

#[debug_handler]
pub(crate) async fn logout(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
) -> AppResult<Json<serde_json::Value>> {
    sqlx::query("DELETE FROM sessions WHERE token=?")
        .bind(&user.token)
        .execute(&db_pool)
        .await?;

    Ok(Json(json!({ "message": "logged out" })))
}
