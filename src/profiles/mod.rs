mod update;

use axum::{Router, routing::put};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", put(update::update_profile))
}
