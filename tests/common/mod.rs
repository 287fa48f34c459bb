#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use itemsvc::db::{Item, ItemStore, RECENT_ITEMS_LIMIT};
use itemsvc::error::ServiceError;
use itemsvc::peers::PeerChecker;
use itemsvc::server::{AppState, app_router};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

/// In-memory stand-in for the Postgres pool.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Item>>,
    down: AtomicBool,
}

impl MemoryStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().expect("store lock poisoned").len()
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.down.load(Ordering::SeqCst) {
            Err(ServiceError::Database(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn ping(&self) -> Result<(), ServiceError> {
        self.check()
    }

    async fn list_recent(&self) -> Result<Vec<Item>, ServiceError> {
        self.check()?;
        let rows = self.rows.lock().expect("store lock poisoned");
        let limit = usize::try_from(RECENT_ITEMS_LIMIT).expect("limit fits usize");
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }

    async fn create(&self, name: &str) -> Result<i32, ServiceError> {
        self.check()?;
        let mut rows = self.rows.lock().expect("store lock poisoned");
        let id = i32::try_from(rows.len()).expect("row count fits i32") + 1;
        rows.push(Item {
            id,
            name: name.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }
}

pub const UNREACHABLE_PEER: &str = "http://127.0.0.1:1";

pub fn app_with(store: Arc<MemoryStore>, redis_url: &str, mongo_url: &str) -> Router {
    let checker = PeerChecker::new(reqwest::Client::new(), redis_url, mongo_url);
    let state = AppState::new("items-test", store, checker);
    app_router(state)
}

pub fn app(store: Arc<MemoryStore>) -> Router {
    app_with(store, UNREACHABLE_PEER, UNREACHABLE_PEER)
}
