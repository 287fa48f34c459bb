use crate::server::router::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

/// GET /health
///
/// Reflects store reachability only; peers are not consulted.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    match state.items.ping().await {
        Ok(()) => Json(json!({ "status": "ok", "service": &*state.app_name })).into_response(),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": e.client_message() })),
            )
                .into_response()
        }
    }
}
