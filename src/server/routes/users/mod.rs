use crate::server::router::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

mod dto;
pub mod handlers;

/// The list route always serves this window.
pub const LIST_OFFSET: u32 = 0;
pub const LIST_LIMIT: u32 = 10;

pub const USERS_PATH: &str = "/api/v1/users";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(USERS_PATH, get(handlers::list_users))
        .route("/api/v1/users/{id}", get(handlers::get_user_by_id))
        .route("/api/v1/create_user", post(handlers::create_user))
        .route("/api/v1/update_user", put(handlers::update_user))
        .route("/api/v1/delete_user/{id}", delete(handlers::delete_user))
}
