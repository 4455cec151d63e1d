use super::error::RepositoryError;
use super::{DbConnection, DbPool};
use anyhow::{Context, Result, anyhow};
use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;
use std::sync::OnceLock;
use std::time::Duration;

static POOL: OnceLock<DbPool> = OnceLock::new();

const MAX_POOL_SIZE: u32 = 15;
const MAX_CONNECT_ATTEMPTS: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Initialize the `PostgreSQL` connection pool with the given database URL.
/// This should be called once at application startup.
pub fn init_pool_with_url(database_url: &str) -> Result<()> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = diesel::r2d2::Pool::builder()
        .max_size(MAX_POOL_SIZE)
        .build(manager)
        .context("Failed to build r2d2 pool")?;

    POOL.set(pool)
        .map_err(|_| anyhow!("Pool already initialized"))?;

    Ok(())
}

/// Initialize the pool, retrying connection establishment with capped
/// exponential backoff (1s, 2s, 4s, ... up to 30s; at most 5 attempts).
pub fn init_pool_with_retry(database_url: &str) -> Result<()> {
    let mut backoff = INITIAL_BACKOFF;
    let mut last_err = None;

    for attempt in 1..=MAX_CONNECT_ATTEMPTS {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        match diesel::r2d2::Pool::builder()
            .max_size(MAX_POOL_SIZE)
            .connection_timeout(Duration::from_secs(10))
            .build(manager)
        {
            Ok(pool) => {
                POOL.set(pool)
                    .map_err(|_| anyhow!("Pool already initialized"))?;
                tracing::info!("✅ Database pool established (attempt {attempt})");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(
                    "Database not reachable (attempt {attempt}/{MAX_CONNECT_ATTEMPTS}): {e}"
                );
                last_err = Some(e);
                if attempt < MAX_CONNECT_ATTEMPTS {
                    std::thread::sleep(backoff);
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }

    Err(anyhow!(
        "Failed to connect to database after {MAX_CONNECT_ATTEMPTS} attempts: {}",
        last_err.map_or_else(|| "unknown".to_string(), |e| e.to_string())
    ))
}

/// Get a reference to the initialized pool.
///
/// # Panics
///
/// Panics if [`init_pool_with_url`] hasn't been called before this function.
pub fn get_pool() -> &'static DbPool {
    POOL.get()
        .expect("DB pool not initialized. Call init_pool_with_url() first.")
}

/// Get a connection from the pool.
/// Returns `RepositoryError` for use in repository layer.
pub fn get_connection() -> Result<DbConnection, RepositoryError> {
    get_pool()
        .get()
        .map_err(|e| RepositoryError::PoolError(e.to_string()))
}

#[cfg(test)]
pub fn init_test_pool() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let url = std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("TEST_DATABASE_URL (or DATABASE_URL) must be set for tests");
        let _ = init_pool_with_url(&url);
    });
}
