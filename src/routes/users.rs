//! User CRUD routes. `/users/page` and `/users/stats` take precedence over `/users/:id`.

use crate::handlers::users::{create, delete, list, page, read, stats, update_role};
use crate::state::AppState;
use axum::{
    routing::{get, patch},
    Router,
};

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/page", get(page))
        .route("/users/stats", get(stats))
        .route("/users/:id", get(read).delete(delete))
        .route("/users/:id/role", patch(update_role))
        .with_state(state)
}
