//! Database module: item persistence on Postgres.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: idempotent DDL applied at startup
//! - `connect.rs`: bounded retry while the store comes up
//! - `repository.rs`: the `ItemStore` seam used by the HTTP layer

pub mod connect;
pub mod models;
pub mod repository;
pub mod schema;

pub use connect::{ConnectPolicy, ConnectionDescriptor, PoolSettings, connect, ensure_schema};
pub use models::Item;
pub use repository::{ItemStore, RECENT_ITEMS_LIMIT};
pub use schema::POSTGRES_INIT;
