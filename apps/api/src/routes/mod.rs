pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interviews::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/interviews",
            post(handlers::handle_create).get(handlers::handle_list),
        )
        .route(
            "/api/interviews/:id",
            get(handlers::handle_get)
                .put(handlers::handle_update)
                .delete(handlers::handle_delete),
        )
        .with_state(state)
}
