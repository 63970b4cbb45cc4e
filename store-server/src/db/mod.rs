//! Database layer
//!
//! SQLite via sqlx. WAL journal mode plus a busy timeout so concurrent
//! request handlers serialize on the database write lock instead of
//! failing fast. Every multi-step domain mutation runs inside one sqlx
//! transaction; the first statement of each such transaction is always
//! a write so the transaction takes the write lock up front.

pub mod repository;
mod schema;

pub use schema::init_schema;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

/// Open (or create) the database at the given path and apply the schema
pub async fn connect(path: impl AsRef<Path>) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// In-memory pool for unit tests (single connection - a private
/// `:memory:` database exists per connection)
#[cfg(test)]
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}
