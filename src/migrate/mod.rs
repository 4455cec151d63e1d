pub mod runner;
pub mod validator;

use crate::db::error::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid migration artifact: {0}")]
    InvalidArtifact(String),
    #[error("Migrations directory not found: {0}")]
    MissingDirectory(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
