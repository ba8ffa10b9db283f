//! Durable extension enabled/disabled state, persisted to sqlite.
//!
//! The table is upsert-only: disabling an extension sets `enabled = 0`, it
//! never deletes the row, so past intent stays inspectable. An id absent
//! from the table is treated as disabled.

use std::collections::HashMap;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use galleria_core::config::DatabaseConfig;
use galleria_core::error::{AppError, ErrorKind};

/// Persists the `extension_id -> enabled` mapping across process restarts.
///
/// The store does not validate ids against discovery; an operator may
/// record intent for an extension whose directory appears later.
#[derive(Debug, Clone)]
pub struct ExtensionStateStore {
    /// The underlying sqlx connection pool.
    pool: SqlitePool,
}

impl ExtensionStateStore {
    /// Open (creating if necessary) the state database from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        if let Some(parent) = Path::new(&config.path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Configuration,
                        format!("Cannot create state directory '{}': {e}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to open state database '{}': {e}", config.path),
                    e,
                )
            })?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS extension_state (
                id TEXT PRIMARY KEY,
                enabled INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create state table", e)
        })?;

        info!(path = %config.path, "Extension state store opened");
        Ok(Self { pool })
    }

    /// Return a reference to the underlying sqlx pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Read the full `id -> enabled` mapping.
    pub async fn get_all(&self) -> Result<HashMap<String, bool>, AppError> {
        let rows: Vec<(String, bool)> =
            sqlx::query_as("SELECT id, enabled FROM extension_state")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to read extension state", e)
                })?;

        Ok(rows.into_iter().collect())
    }

    /// Return the enabled flag for one id, defaulting to `false`.
    pub async fn get(&self, id: &str) -> Result<bool, AppError> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT enabled FROM extension_state WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to read extension state", e)
                })?;

        Ok(row.map(|(enabled,)| enabled).unwrap_or(false))
    }

    /// Record the enabled flag for an id.
    ///
    /// Implemented as a transactional upsert so concurrent writers for the
    /// same id resolve last-writer-wins and writers for different ids never
    /// interfere. Unknown ids are accepted; existence validation belongs to
    /// the lifecycle manager.
    pub async fn set_state(&self, id: &str, enabled: bool) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO extension_state (id, enabled) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET enabled = excluded.enabled",
        )
        .bind(id)
        .bind(enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to persist state for extension '{id}'"),
                e,
            )
        })?;

        Ok(())
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Extension state store closed");
    }
}
