use crate::server::router::AppState;
use crate::utils::logging::debug_json;
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::debug;

/// Value of the `postgres` key; the handler only runs once the store is up.
pub const POSTGRES_MARKER: &str = "connected";

#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub service: String,
    pub postgres: &'static str,
    pub redis_service: String,
    pub mongo_service: String,
}

/// GET /demo
///
/// Always 200. A failed peer call shows up as `error: ...` in its field.
pub async fn demo_handler(State(state): State<AppState>) -> Json<DemoReport> {
    let peers = state.checker.check_all().await;

    let report = DemoReport {
        service: state.app_name.to_string(),
        postgres: POSTGRES_MARKER,
        redis_service: peers.redis_service,
        mongo_service: peers.mongo_service,
    };

    if let Some(pretty) = debug_json(&report) {
        debug!(report = %pretty, "Composed peer report");
    }
    Json(report)
}
