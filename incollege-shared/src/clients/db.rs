use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;

use crate::errors::{AppError, AppResult};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Per-connection pragmas applied whenever the pool hands out a connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl ConnectionOptions {
    pub fn apply(&self, conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;",
            self.busy_timeout.as_millis()
        ))
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        self.apply(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn create_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .test_on_check_out(true)
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)?;

    tracing::info!(database_url, max_size, "database connection pool created");
    Ok(pool)
}

pub fn get_conn(pool: &DbPool) -> AppResult<DbConn> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

/// Run `f` inside `BEGIN IMMEDIATE`, so concurrent writers serialize and the
/// whole operation commits or rolls back as one unit.
pub fn write_transaction<T, F>(pool: &DbPool, f: F) -> AppResult<T>
where
    F: FnOnce(&mut SqliteConnection) -> AppResult<T>,
{
    let mut pooled = get_conn(pool)?;
    let conn: &mut SqliteConnection = &mut pooled;
    conn.immediate_transaction(f)
}

/// Run `f` inside a deferred transaction so multi-table reads observe one snapshot.
pub fn read_transaction<T, F>(pool: &DbPool, f: F) -> AppResult<T>
where
    F: FnOnce(&mut SqliteConnection) -> AppResult<T>,
{
    let mut pooled = get_conn(pool)?;
    let conn: &mut SqliteConnection = &mut pooled;
    conn.transaction(f)
}

/// `write_transaction` on the blocking pool. A writer parked on the SQLite
/// lock for up to `busy_timeout` must not hold an async worker.
pub async fn spawn_write<T, F>(pool: &DbPool, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> AppResult<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || write_transaction(&pool, f))
        .await
        .map_err(|e| AppError::internal(format!("database task failed: {e}")))?
}

/// `read_transaction` on the blocking pool.
pub async fn spawn_read<T, F>(pool: &DbPool, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut SqliteConnection) -> AppResult<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || read_transaction(&pool, f))
        .await
        .map_err(|e| AppError::internal(format!("database task failed: {e}")))?
}
