use super::{CacheConnection, CacheError, CachePool};
use anyhow::{Context, Result, anyhow};
use std::sync::OnceLock;
use std::time::Duration;

static POOL: OnceLock<CachePool> = OnceLock::new();

const MAX_POOL_SIZE: u32 = 15;

/// Initialize the redis connection pool. Called once at startup, after the
/// database is up (the ephemeral store is a hard dependency of the token
/// lifecycle, not an optional accelerator).
pub fn init_cache_with_url(redis_url: &str) -> Result<()> {
    let client = redis::Client::open(redis_url).context("Invalid redis URL")?;
    let pool = r2d2::Pool::builder()
        .max_size(MAX_POOL_SIZE)
        .connection_timeout(Duration::from_secs(10))
        .build(client)
        .context("Failed to build redis pool")?;

    POOL.set(pool)
        .map_err(|_| anyhow!("Cache pool already initialized"))?;

    Ok(())
}

/// Get a connection from the pool.
/// Returns `CacheError` for use in the token store.
pub fn get_cache_connection() -> Result<CacheConnection, CacheError> {
    let pool = POOL
        .get()
        .ok_or_else(|| CacheError::PoolError("Cache pool not initialized".to_string()))?;
    pool.get().map_err(Into::into)
}

#[cfg(test)]
pub fn init_test_cache() {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let url = std::env::var("TEST_REDIS_URL")
            .or_else(|_| std::env::var("REDIS_URL"))
            .unwrap_or_else(|_| "redis://127.0.0.1:6379/1".to_string());
        let _ = init_cache_with_url(&url);
    });
}
