use axum::{Json, debug_handler, extract::State};
use sqlx::SqlitePool;

use crate::{AppResult, db, db::Profile};

use super::AuthUser;

#[debug_handler]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    user: AuthUser,
) -> AppResult<Json<Profile>> {
    let profile = db::fetch_profile(&db_pool, user.id).await?;
    Ok(Json(profile))
}
