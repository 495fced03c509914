use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use parking_lot::RwLock;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{error, info, warn};

/// Location that opens a transient database instead of a file.
pub const MEMORY_LOCATION: &str = ":memory:";

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        display_name TEXT UNIQUE NOT NULL,
        bio TEXT,
        pfp_link TEXT,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recipes (
        recipe_id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        recipe_data TEXT NOT NULL,
        forked_from INTEGER DEFAULT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users(user_id),
        FOREIGN KEY (forked_from) REFERENCES recipes(recipe_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipe_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        comment_text TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (recipe_id) REFERENCES recipes(recipe_id),
        FOREIGN KEY (user_id) REFERENCES users(user_id)
    )
    "#,
];

/// Failures raised by the persistence gateway.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database file {0:?} does not exist")]
    NotFound(String),

    #[error("error connecting to database: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("database not yet initialized, call connect() first")]
    NotInitialized,

    #[error("error querying the database: {0}")]
    Query(#[source] sqlx::Error),

    #[error("unique constraint violated: {0}")]
    Conflict(#[source] sqlx::Error),

    #[error("database query timed out after {0:?}")]
    Timeout(Duration),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let unique = matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation());
        if unique {
            DbError::Conflict(err)
        } else {
            DbError::Query(err)
        }
    }
}

/// Sole owner of the SQLite connection.
///
/// The pool is capped at a single connection that is never reaped, so every
/// query goes through the same handle and an in-memory database survives for
/// as long as the gateway stays connected.
pub struct Database {
    pool: RwLock<Option<SqlitePool>>,
    connect_lock: tokio::sync::Mutex<()>,
    query_timeout: Duration,
}

impl Database {
    pub fn new(query_timeout: Duration) -> Self {
        Self {
            pool: RwLock::new(None),
            connect_lock: tokio::sync::Mutex::new(()),
            query_timeout,
        }
    }

    /// Opens the store at `location` and makes sure the schema exists.
    ///
    /// Any connection that is already open is closed before the new one
    /// replaces it. Concurrent calls are serialized.
    pub async fn connect(&self, location: &str) -> Result<(), DbError> {
        let _connecting = self.connect_lock.lock().await;

        let in_memory = location == MEMORY_LOCATION;
        if !in_memory && !Path::new(location).exists() {
            warn!(location, "database file missing");
            return Err(DbError::NotFound(location.to_string()));
        }

        let previous = self.pool.write().take();
        if let Some(previous) = previous {
            warn!("connect called while connected; closing previous handle");
            previous.close().await;
        }

        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(DbError::Connection)?
        } else {
            SqliteConnectOptions::new()
                .filename(location)
                .create_if_missing(false)
        };
        let options = options.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(self.query_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!(error = %e, location, "error connecting to database");
                DbError::Connection(e)
            })?;

        // sqlx opens lazily; a corrupt file only fails on first read.
        if let Err(e) = self.check_readable(&pool).await {
            error!(error = %e, location, "database refused to open");
            pool.close().await;
            return Err(e);
        }

        if let Err(e) = self.create_schema(&pool).await {
            error!(error = %e, location, "schema initialization failed");
            pool.close().await;
            return Err(e);
        }

        let stale = self.pool.write().replace(pool);
        if let Some(stale) = stale {
            stale.close().await;
        }
        info!(location, "connected to the ForkedFlavors database");
        Ok(())
    }

    async fn check_readable(&self, pool: &SqlitePool) -> Result<(), DbError> {
        let check = sqlx::query("PRAGMA schema_version").fetch_optional(pool);
        match tokio::time::timeout(self.query_timeout, check).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(DbError::Connection(e)),
            Err(_) => Err(DbError::Timeout(self.query_timeout)),
        }
    }

    async fn create_schema(&self, pool: &SqlitePool) -> Result<(), DbError> {
        for statement in SCHEMA {
            self.run(sqlx::query(statement).execute(pool)).await?;
        }
        Ok(())
    }

    /// The active connection handle.
    pub fn handle(&self) -> Result<SqlitePool, DbError> {
        self.pool.read().clone().ok_or(DbError::NotInitialized)
    }

    pub fn is_connected(&self) -> bool {
        self.pool.read().is_some()
    }

    pub async fn close(&self) -> Result<(), DbError> {
        let pool = self.pool.write().take().ok_or(DbError::NotInitialized)?;
        pool.close().await;
        info!("database connection closed");
        Ok(())
    }

    /// Runs one query future under the configured timeout.
    pub(crate) async fn run<T, F>(&self, query: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(DbError::from),
            Err(_) => Err(DbError::Timeout(self.query_timeout)),
        }
    }
}
