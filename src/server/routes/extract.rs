use crate::error::ServiceError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::Deserialize;
use tracing::debug;

/// Body of `POST /items`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
}

/// A `CreateItemRequest` whose `name` is known to be non-blank.
pub struct ValidCreateItem(pub CreateItemRequest);

impl<S> FromRequest<S> for ValidCreateItem
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    /// Decode and validate a create request before it reaches the store.
    ///
    /// The body is decoded as JSON whatever `Content-Type` says.
    /// - Unreadable body, bad syntax, or a missing or non-string `name`
    ///   => `400 invalid json`.
    /// - A blank `name` => `400 name is required`.
    ///
    /// The name is stored exactly as sent; it is not trimmed.
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            debug!(error = %rejection.body_text(), "Failed to read request body");
            ServiceError::InvalidRequest("invalid json".to_string())
        })?;
        let body: CreateItemRequest = serde_json::from_slice(&bytes)?;

        if body.name.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("name is required".to_string()));
        }

        debug!(name = %body.name, "Extracted create item request");
        Ok(Self(body))
    }
}
