// SPDX-License-Identifier: MIT
//! Built-in health checks and the stable ids their messages carry.
//!
//! The id constants are the silencing contract: external configuration may
//! reference them to acknowledge a known condition without changing the
//! check itself.
//!
//! Built-in checks never panic — they convert their expected failure modes
//! into [`CheckMessage`]s, as the execution engine requires.

use std::path::Path;

use crate::checks::CheckMessage;

/// The configured database cannot be reached at all.
pub const ERROR_CANNOT_CONNECT_DATABASE: &str = "dockerflow.health.E001";
/// The database is reachable but refuses to execute a trivial query.
pub const ERROR_UNUSABLE_DATABASE: &str = "dockerflow.health.E002";
/// The data directory does not exist.
pub const ERROR_STORAGE_MISSING: &str = "dockerflow.health.E011";
/// The data directory path exists but is not a directory.
pub const ERROR_STORAGE_NOT_DIR: &str = "dockerflow.health.E012";
/// The data directory exists but rejects writes.
pub const ERROR_STORAGE_NOT_WRITABLE: &str = "dockerflow.health.E013";

/// Check that the database pool can execute a `SELECT 1` round-trip.
///
/// Register it as a closure capturing the pool:
///
/// ```rust,no_run
/// # async fn demo(pool: sqlx::SqlitePool) {
/// dockerflow::checks::register_async("database", move || {
///     let pool = pool.clone();
///     async move { dockerflow::health::check_database_connected(&pool).await }
/// });
/// # }
/// ```
#[cfg(feature = "db")]
pub async fn check_database_connected(pool: &sqlx::SqlitePool) -> Vec<CheckMessage> {
    let result: Result<(i64,), sqlx::Error> = sqlx::query_as("SELECT 1").fetch_one(pool).await;
    match result {
        Ok(_) => Vec::new(),
        Err(e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_))) => {
            vec![
                CheckMessage::error(format!("Could not connect to database: {e}"))
                    .with_id(ERROR_CANNOT_CONNECT_DATABASE),
            ]
        }
        Err(e) => vec![
            CheckMessage::error(format!("Database query failed: {e}"))
                .with_id(ERROR_UNUSABLE_DATABASE),
        ],
    }
}

/// Check that `path` exists, is a directory, and accepts a probe file.
///
/// This is a blocking filesystem check; the concurrent engine moves it to a
/// worker thread when it is registered as a synchronous check.
pub fn check_storage_writable(path: &Path) -> Vec<CheckMessage> {
    if !path.exists() {
        return vec![
            CheckMessage::error(format!("data directory does not exist: {}", path.display()))
                .with_subject(path.display().to_string())
                .with_id(ERROR_STORAGE_MISSING),
        ];
    }
    if !path.is_dir() {
        return vec![
            CheckMessage::error(format!("data directory is not a directory: {}", path.display()))
                .with_subject(path.display().to_string())
                .with_id(ERROR_STORAGE_NOT_DIR),
        ];
    }
    if !is_writable(path) {
        return vec![
            CheckMessage::error(format!("data directory is not writable: {}", path.display()))
                .with_subject(path.display().to_string())
                .with_hint("fix the directory ownership or mode")
                .with_id(ERROR_STORAGE_NOT_WRITABLE),
        ];
    }
    Vec::new()
}

/// Attempt to create a probe file in the directory.
fn is_writable(path: &Path) -> bool {
    let probe = path.join(".dockerflow_probe");
    match std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&probe)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}
