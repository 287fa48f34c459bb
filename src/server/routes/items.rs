use super::extract::ValidCreateItem;
use crate::db::Item;
use crate::error::ServiceError;
use crate::server::router::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    routing::{MethodFilter, MethodRouter, on},
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct CreatedItem {
    pub id: i32,
    pub name: String,
}

pub(super) fn method_router() -> MethodRouter<AppState> {
    // HEAD would otherwise be served by the GET handler.
    on(MethodFilter::GET, list_items_handler)
        .on(MethodFilter::POST, create_item_handler)
        .on(MethodFilter::HEAD, method_not_allowed)
        .fallback(method_not_allowed)
}

/// GET /items
///
/// Always a JSON array; `[]` when the table is empty.
pub async fn list_items_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Item>>, ServiceError> {
    let items = state.items.list_recent().await?;
    Ok(Json(items))
}

/// POST /items
pub async fn create_item_handler(
    State(state): State<AppState>,
    ValidCreateItem(req): ValidCreateItem,
) -> Result<(StatusCode, Json<CreatedItem>), ServiceError> {
    let id = state.items.create(&req.name).await?;
    info!(id, name = %req.name, "Item created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedItem { id, name: req.name }),
    ))
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}
