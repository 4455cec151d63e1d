pub mod connection;
pub mod token_store;

use std::fmt;

pub type CachePool = r2d2::Pool<redis::Client>;
pub type CacheConnection = r2d2::PooledConnection<redis::Client>;

/// Ephemeral-store errors. Absence of a key is never an error; only
/// transport and encoding failures surface here.
#[derive(Debug)]
pub enum CacheError {
    PoolError(String),
    TransportError(String),
    EncodingError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::PoolError(msg) => write!(f, "Cache pool error: {}", msg),
            CacheError::TransportError(msg) => write!(f, "Cache transport error: {}", msg),
            CacheError::EncodingError(msg) => write!(f, "Cache encoding error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::TransportError(err.to_string())
    }
}

impl From<r2d2::Error> for CacheError {
    fn from(err: r2d2::Error) -> Self {
        CacheError::PoolError(err.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::EncodingError(err.to_string())
    }
}
