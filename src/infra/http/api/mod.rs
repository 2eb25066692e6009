pub mod error;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::infra::http::middleware::{allow_cors, log_responses, set_request_context};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/products", get(handlers::list_products))
        .route("/api/products/{id}", get(handlers::get_product))
        .route("/api/products/{id}/like", post(handlers::like_product))
        .route("/_health/db", get(handlers::db_health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(allow_cors))
        .layer(axum_middleware::from_fn(set_request_context))
}
