//! SQL DDL for initializing the database schema.

/// Postgres schema: the single `items` table.
///
/// `IF NOT EXISTS` keeps this safe to run on every start.
pub const POSTGRES_INIT: &str = r"
CREATE TABLE IF NOT EXISTS items (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)
";
