use crate::config::Config;
use crate::db::ItemStore;
use crate::error::ServiceError;
use crate::peers::PeerChecker;
use crate::server::routes;

use axum::{
    Router,
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// 12 random bytes, base64url without padding.
fn new_request_id() -> String {
    let bytes: [u8; 12] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Caller-supplied id when usable, otherwise a fresh one.
fn request_id_for(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(new_request_id, str::to_string)
}

/// Per-process context handed to every handler. Built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub app_name: Arc<str>,
    pub items: Arc<dyn ItemStore>,
    pub checker: PeerChecker,
}

impl AppState {
    pub fn new(app_name: impl Into<Arc<str>>, items: Arc<dyn ItemStore>, checker: PeerChecker) -> Self {
        Self {
            app_name: app_name.into(),
            items,
            checker,
        }
    }

    pub fn from_config(cfg: &Config, items: Arc<dyn ItemStore>) -> Result<Self, ServiceError> {
        let checker = PeerChecker::from_config(cfg)?;
        Ok(Self::new(cfg.app_name.as_str(), items, checker))
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// One line per request: 5xx at error, 4xx at warn, the rest at info.
async fn access_log(req: Request, next: Next) -> Response {
    let request_id = request_id_for(req.headers());
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let protocol = format!("{:?}", req.version());
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();

    let start = Instant::now();
    let mut resp = next.run(req).await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let line = format!(
        "| {status} | {request_id} | {method} {path} {protocol} | {latency_ms}ms | {user_agent}"
    );
    if status.is_server_error() {
        error!("{line}");
    } else if status.is_client_error() {
        warn!("{line}");
    } else {
        info!("{line}");
    }

    resp
}

pub fn app_router(state: AppState) -> Router {
    routes::router()
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_request_ids_are_short_and_distinct() {
        let a = new_request_id();
        let b = new_request_id();
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }

    #[test]
    fn oversized_or_empty_request_ids_are_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static(""));
        assert_eq!(request_id_for(&headers).len(), 16);

        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        headers.insert(
            X_REQUEST_ID,
            HeaderValue::from_str(&long).expect("ascii header value"),
        );
        assert_ne!(request_id_for(&headers), long);

        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id_for(&headers), "abc");
    }
}
