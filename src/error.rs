// src/error.rs

use crate::dto::responses::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

#[derive(Debug, Clone)]
pub enum AppError {
    // === Addressing ===
    NotFound(String),

    // === Conflicts ===
    Duplicate(String),
    EmailTaken,
    UsernameTaken,

    // === Credentials ===
    // Unknown user and wrong password collapse into this one variant so
    // nothing downstream can accidentally tell them apart.
    InvalidCredentials,
    AccountInactive,
    AccountLocked,
    InvalidToken,
    InvalidRefreshToken,
    RefreshNotFound,
    UnauthorizedAction(String),

    // === Validation ===
    InvalidEmail,
    WeakPassword(String),
    ValidationError(String),
    InvalidInput(String),

    // === Crypto ===
    PasswordHashingFailed(String),
    TokenGenerationFailed(String),
    InvalidTokenFormat,

    // === Downstream stores ===
    DatabaseError(String),
    Transient(String),

    // === Internal ===
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Duplicate(msg) => write!(f, "Already exists: {}", msg),
            AppError::EmailTaken => write!(f, "Email already exists"),
            AppError::UsernameTaken => write!(f, "Username already exists"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::AccountInactive => write!(f, "Account is inactive"),
            AppError::AccountLocked => write!(f, "Account is temporarily locked"),
            AppError::InvalidToken => write!(f, "Invalid token"),
            AppError::InvalidRefreshToken => write!(f, "Invalid refresh token"),
            AppError::RefreshNotFound => write!(f, "Refresh token not found"),
            AppError::UnauthorizedAction(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InvalidEmail => write!(f, "Invalid email format"),
            AppError::WeakPassword(msg) => write!(f, "Password too weak: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::PasswordHashingFailed(msg) => write!(f, "Password hashing failed: {}", msg),
            AppError::TokenGenerationFailed(msg) => write!(f, "Token generation failed: {}", msg),
            AppError::InvalidTokenFormat => write!(f, "Invalid token format"),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Transient(msg) => write!(f, "Service temporarily unavailable: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = self.get_error_info();

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl AppError {
    fn get_error_info(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            // 404 Not Found
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),

            // 409 Conflict
            AppError::Duplicate(msg) => {
                (StatusCode::CONFLICT, "DUPLICATE_ENTRY", msg.clone(), None)
            }
            AppError::EmailTaken => (
                StatusCode::CONFLICT,
                "EMAIL_EXISTS",
                "Email already exists".to_string(),
                None,
            ),
            AppError::UsernameTaken => (
                StatusCode::CONFLICT,
                "USERNAME_EXISTS",
                "Username already exists".to_string(),
                None,
            ),

            // 401 Unauthorized
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
                None,
            ),
            AppError::AccountInactive => (
                StatusCode::UNAUTHORIZED,
                "ACCOUNT_INACTIVE",
                "Account is inactive".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid or expired token".to_string(),
                None,
            ),
            AppError::InvalidRefreshToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_REFRESH_TOKEN",
                "Invalid refresh token".to_string(),
                None,
            ),
            AppError::RefreshNotFound => (
                StatusCode::UNAUTHORIZED,
                "REFRESH_NOT_FOUND",
                "Refresh token not found".to_string(),
                None,
            ),
            AppError::UnauthorizedAction(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }

            // 429 Too Many Requests
            AppError::AccountLocked => (
                StatusCode::TOO_MANY_REQUESTS,
                "ACCOUNT_LOCKED",
                "Account temporarily locked after repeated failures. Try again later.".to_string(),
                None,
            ),

            // 400 Bad Request
            AppError::InvalidEmail => (
                StatusCode::BAD_REQUEST,
                "INVALID_EMAIL",
                "Invalid email format".to_string(),
                None,
            ),
            AppError::WeakPassword(msg) => {
                (StatusCode::BAD_REQUEST, "WEAK_PASSWORD", msg.clone(), None)
            }
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone(), None)
            }
            AppError::InvalidTokenFormat => (
                StatusCode::BAD_REQUEST,
                "INVALID_TOKEN_FORMAT",
                "Token format is invalid".to_string(),
                None,
            ),

            // 500 Internal Server Error
            AppError::PasswordHashingFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "HASHING_ERROR",
                "An error occurred while processing your request".to_string(),
                Some(msg.clone()),
            ),
            AppError::TokenGenerationFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_ERROR",
                "An error occurred while generating token".to_string(),
                Some(msg.clone()),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "An error occurred with the database".to_string(),
                Some(msg.clone()),
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                Some(msg.clone()),
            ),

            // 503 Service Unavailable
            AppError::Transient(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Service temporarily unavailable, retry later".to_string(),
                Some(msg.clone()),
            ),
        }
    }

    // === Constructeurs helpers ===
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        AppError::Duplicate(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        AppError::DatabaseError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::UnauthorizedAction(msg.into())
    }

    pub fn hashing_failed(msg: impl Into<String>) -> Self {
        AppError::PasswordHashingFailed(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        AppError::Transient(msg.into())
    }

    /// Retourne le code de statut HTTP
    pub fn status_code(&self) -> StatusCode {
        self.get_error_info().0
    }
}

// === Conversions automatiques depuis d'autres types d'erreurs ===

impl From<crate::db::error::RepositoryError> for AppError {
    fn from(err: crate::db::error::RepositoryError) -> Self {
        use crate::db::error::RepositoryError;
        match err {
            RepositoryError::NotFound(msg) => AppError::not_found(msg),
            RepositoryError::UniqueViolation(msg) => AppError::duplicate(msg),
            RepositoryError::PoolError(msg) => AppError::transient(msg),
            RepositoryError::ForeignKeyViolation(msg) => AppError::database(msg),
            RepositoryError::InvalidArgument(msg) => AppError::validation(msg),
            RepositoryError::DatabaseError(msg) => AppError::database(msg),
        }
    }
}

impl From<crate::cache::CacheError> for AppError {
    fn from(err: crate::cache::CacheError) -> Self {
        use crate::cache::CacheError;
        match err {
            CacheError::PoolError(msg) | CacheError::TransportError(msg) => {
                AppError::transient(msg)
            }
            CacheError::EncodingError(msg) => AppError::internal(msg),
        }
    }
}

impl From<crate::auth::jwt::JwtError> for AppError {
    fn from(err: crate::auth::jwt::JwtError) -> Self {
        use crate::auth::jwt::JwtError;
        match err {
            JwtError::GenerationFailed(e) => AppError::TokenGenerationFailed(e.to_string()),
            JwtError::VerificationFailed(_) | JwtError::WrongTokenType { .. } => {
                AppError::InvalidToken
            }
        }
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::invalid_input(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::error::RepositoryError;

    #[test]
    fn test_error_display() {
        let err = AppError::not_found("User");
        assert_eq!(err.to_string(), "Not found: User");
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            AppError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::AccountLocked.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::transient("down").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn credential_failures_share_one_message() {
        // Account enumeration guard: both sides of a failed login read the
        // same to the caller.
        let (_, _, unknown_user_msg, _) = AppError::InvalidCredentials.get_error_info();
        assert_eq!(unknown_user_msg, "Invalid credentials");
    }

    #[test]
    fn pool_errors_map_to_transient() {
        let err: AppError = RepositoryError::PoolError("pool exhausted".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_response() {
        let err = AppError::not_found("User");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
