use crate::db::connect::ping_once;
use crate::db::models::Item;
use crate::error::ServiceError;
use async_trait::async_trait;
use sqlx::{Connection, PgPool};

/// Most rows `list_recent` will ever return.
pub const RECENT_ITEMS_LIMIT: i64 = 20;

/// Item persistence as seen by the HTTP layer.
///
/// Every call reads or writes the store directly; nothing is cached between
/// requests. Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Round-trips to the store without touching any table.
    async fn ping(&self) -> Result<(), ServiceError>;

    /// Up to [`RECENT_ITEMS_LIMIT`] items, highest id first.
    async fn list_recent(&self) -> Result<Vec<Item>, ServiceError>;

    /// Inserts one item and returns the id the store assigned.
    async fn create(&self, name: &str) -> Result<i32, ServiceError>;
}

#[async_trait]
impl ItemStore for PgPool {
    async fn ping(&self) -> Result<(), ServiceError> {
        match self.acquire().await {
            Ok(mut conn) => {
                conn.ping().await?;
                Ok(())
            }
            // The pool only reports that it gave up; a direct attempt names the cause.
            Err(sqlx::Error::PoolTimedOut) => {
                let deadline = self.options().get_acquire_timeout();
                ping_once(&self.connect_options(), deadline).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_recent(&self) -> Result<Vec<Item>, ServiceError> {
        // `created_at` has no zone; it was written in the session time zone.
        let items = sqlx::query_as::<_, Item>(
            r"
            SELECT id, name, created_at::timestamptz AS created_at
            FROM items
            ORDER BY id DESC
            LIMIT $1
            ",
        )
        .bind(RECENT_ITEMS_LIMIT)
        .fetch_all(self)
        .await?;

        Ok(items)
    }

    async fn create(&self, name: &str) -> Result<i32, ServiceError> {
        let id: i32 = sqlx::query_scalar("INSERT INTO items (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(self)
            .await?;

        Ok(id)
    }
}
