mod list;
mod request;
mod search;

pub use search::search_users;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::friends_index))
        .route("/requests", get(list::pending_index))
        .route("/request", post(request::send_request))
        .route("/accept", post(request::accept_request))
        .route("/{friendship_id}", delete(request::remove_friend))
}
