use crate::server::router::AppState;
use axum::{Router, routing::get};

pub mod demo;
pub mod extract;
pub mod health;
pub mod items;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/items", items::method_router())
        .route("/demo", get(demo::demo_handler))
}
