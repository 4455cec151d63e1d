use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use std::sync::Arc;

use crate::auth::jwt::TokenSigner;
use crate::auth::services::AuthService;
use crate::cache::token_store::TokenStore;
use crate::db::models::user::UserRole;
use crate::error::AppError;

/// Authentication extractor for protected routes.
/// Validates `Authorization: Bearer <JWT>` as an access bundle, rejects
/// blacklisted tokens, and exposes the useful claims (plus the raw token,
/// which logout needs for the revocation tombstone).
#[derive(Debug, Clone)]
pub struct AuthClaims {
    pub sub: uuid::Uuid,
    pub email: String,
    pub role: UserRole,
    pub token: String,
}

impl FromRequestParts<Arc<AuthService>> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &Arc<AuthService>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::InvalidTokenFormat)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::InvalidTokenFormat)?;

        const BEARER: &str = "Bearer ";
        if !auth_str.starts_with(BEARER) {
            return Err(AppError::InvalidTokenFormat);
        }

        let token = &auth_str[BEARER.len()..];

        let claims = service
            .signer()
            .verify_access(token)
            .map_err(|_| AppError::unauthorized("Invalid token"))?;

        // Revoked-before-expiry tokens carry a tombstone in the ephemeral
        // store; a transport failure there fails closed as 503.
        if TokenStore::is_token_blacklisted(&TokenSigner::hash_token(token))? {
            return Err(AppError::unauthorized("Invalid token"));
        }

        Ok(AuthClaims {
            sub: claims.user_id,
            email: claims.email,
            role: claims.role,
            token: token.to_string(),
        })
    }
}
