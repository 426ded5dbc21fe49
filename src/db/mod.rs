//! Database connection setup.

use std::time::Duration;

use anyhow::Context;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

const POOL_SIZE: u32 = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// Pool settings for `database_url`.
///
/// Every connection to an in-memory `SQLite` database opens its own empty database, so those
/// URLs get exactly one connection and it is never recycled.
#[must_use]
pub fn connect_options(database_url: &str) -> ConnectOptions {
    let mut opts = ConnectOptions::new(database_url);
    opts.connect_timeout(CONNECT_TIMEOUT)
        .acquire_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);

    if is_sqlite_memory(database_url) {
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(POOL_SIZE)
            .min_connections(1)
            .idle_timeout(IDLE_TIMEOUT)
            .max_lifetime(MAX_LIFETIME);
    }

    opts
}

/// Open the connection pool described by [`connect_options`].
///
/// # Errors
///
/// Returns an error if the database is unreachable or the URL names an unsupported backend.
pub async fn connect(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    Database::connect(connect_options(database_url))
        .await
        .context("Failed to connect to the database")
}

fn is_sqlite_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite:")
        && (database_url.contains(":memory:") || database_url.contains("mode=memory"))
}
