pub mod customers;
mod models;
mod seeders;
pub mod users;

pub use models::*;
pub use seeders::seed_admin_user;

use arc_swap::ArcSwap;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub type DbPool = SqlitePool;

/// Handle to the database file.
///
/// Clones share one connection pool. The pool can be closed and swapped for a
/// fresh one (see [`Store::reopen`]), which is how a restore replaces the file
/// underneath a running application.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    pool: ArcSwap<DbPool>,
}

impl Store {
    /// Open (creating if needed) the database file and bring the schema up to date
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        info!("Initializing database at {}", path.display());

        let pool = connect(path).await?;
        run_migrations(&pool).await?;

        info!("Database initialized successfully");
        Ok(Self {
            inner: Arc::new(StoreInner {
                path: path.to_path_buf(),
                pool: ArcSwap::from_pointee(pool),
            }),
        })
    }

    /// Current connection pool
    pub fn pool(&self) -> Arc<DbPool> {
        self.inner.pool.load_full()
    }

    /// Path of the live database file
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Close the connection. Queries fail until [`Store::reopen`] is called.
    pub async fn close(&self) {
        debug!("Closing database connection");
        self.inner.pool.load().close().await;
    }

    /// Connect to the database file again and make it the current pool.
    /// The schema is brought up to date, so a file without tables becomes usable.
    pub async fn reopen(&self) -> Result<(), sqlx::Error> {
        let pool = connect(&self.inner.path).await?;
        let previous = self.inner.pool.swap(Arc::new(pool));
        previous.close().await;
        info!("Database connection reopened at {}", self.inner.path.display());
        run_migrations(&self.pool()).await
    }
}

/// A single connection: every statement runs one after another
async fn connect(path: &Path) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
}

/// Execute a SQL migration file, properly handling comments
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<(), sqlx::Error> {
    for statement in sql.split(';') {
        // Strip SQL comment lines (lines starting with --)
        let cleaned: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = cleaned.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Running database migrations...");

    // Migration 001: users and customers
    execute_sql(pool, include_str!("../../migrations/001_initial.sql")).await?;

    info!("Migrations completed");
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Store;
    use tempfile::TempDir;

    /// Fresh store in a temporary directory. Keep the `TempDir` alive for the test.
    pub async fn temp_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("customer_data.db"))
            .await
            .unwrap();
        (dir, store)
    }
}
