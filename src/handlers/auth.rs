// src/handlers/auth.rs

use crate::auth::extractors::AuthClaims;
use crate::auth::services::AuthService;
use crate::dto::requests::{
    ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, VerifyTokenRequest,
};
use crate::dto::responses::{
    AuthResponse, MessageResponse, RefreshResponse, UserResponse, VerifyResponse,
};
use crate::error::AppError;
use crate::response::AppResponse;
use axum::extract::State;
use axum::{
    Json,
    http::{HeaderMap, HeaderValue, header},
};
use ipnetwork::IpNetwork;
use std::sync::Arc;

/// Best-effort client address: gateway headers first, unspecified when the
/// service is reached without a proxy in front.
fn client_ip(headers: &HeaderMap) -> IpNetwork {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|h| h.to_str().ok())
        .and_then(|raw| raw.split(',').next())
        .and_then(|ip| ip.trim().parse::<std::net::IpAddr>().ok())
        .map(IpNetwork::from)
        .unwrap_or_else(|| IpNetwork::from(std::net::IpAddr::from([0, 0, 0, 0])))
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation failure", body = crate::dto::responses::ErrorResponse),
        (status = 409, description = "Email or username taken", body = crate::dto::responses::ErrorResponse),
    )
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<AppResponse<AuthResponse>, AppError> {
    let response = service.register(payload)?;
    Ok(AppResponse::created(response))
}

/// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::dto::responses::ErrorResponse),
        (status = 429, description = "Account locked", body = crate::dto::responses::ErrorResponse),
    )
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<AppResponse<AuthResponse>, AppError> {
    let ip = client_ip(&headers);
    let ua = user_agent(&headers);

    let response = service.login(&payload, ip, ua)?;
    Ok(AppResponse::ok(response))
}

/// POST /api/v1/auth/refresh
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    tag = "Auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Rotated pair", body = RefreshResponse),
        (status = 401, description = "Refresh rejected", body = crate::dto::responses::ErrorResponse),
    )
)]
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<AppResponse<RefreshResponse>, AppError> {
    let response = service.refresh_token(&payload)?;
    Ok(AppResponse::ok(response))
}

/// POST /api/v1/verify
///
/// Forward-auth endpoint for the gateway. The token arrives as a Bearer
/// header (Traefik style) or in the JSON body; the reply carries the
/// attestation headers the proxy copies onto the upstream request.
#[utoipa::path(
    post,
    path = "/api/v1/verify",
    tag = "Auth",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Token rejected", body = VerifyResponse),
    )
)]
pub async fn verify_token(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
    body: String,
) -> Result<AppResponse<VerifyResponse>, AppError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::to_string);

    let from_body = || {
        serde_json::from_str::<VerifyTokenRequest>(&body)
            .ok()
            .and_then(|req| req.token)
    };

    let token = match bearer.or_else(from_body) {
        Some(token) => token,
        None => {
            let mut out_headers = HeaderMap::new();
            out_headers.insert("X-Auth-Status", HeaderValue::from_static("failed"));
            return Ok(
                AppResponse::unauthorized(VerifyResponse::invalid()).with_headers(out_headers)
            );
        }
    };

    let response = service.verify_token(&token);

    let mut out_headers = HeaderMap::new();
    if response.valid {
        if let Some(user_id) = response.user_id {
            if let Ok(value) = HeaderValue::from_str(&user_id.to_string()) {
                out_headers.insert("X-User-ID", value);
            }
        }
        if let Some(role) = response.role {
            out_headers.insert("X-User-Role", HeaderValue::from_static(role.as_str()));
        }
        if let Some(email) = &response.email {
            if let Ok(value) = HeaderValue::from_str(email) {
                out_headers.insert("X-User-Email", value);
            }
        }
        out_headers.insert("X-Auth-Status", HeaderValue::from_static("authenticated"));
        Ok(AppResponse::ok(response).with_headers(out_headers))
    } else {
        // No attestation, no reason. The gateway only needs the 401.
        out_headers.insert("X-Auth-Status", HeaderValue::from_static("invalid"));
        Ok(AppResponse::unauthorized(response).with_headers(out_headers))
    }
}

/// POST /api/v1/auth/logout
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = crate::dto::responses::ErrorResponse),
    )
)]
pub async fn logout(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    service.logout(claims.sub, &claims.token)?;
    Ok(AppResponse::ok(MessageResponse::new(
        "Logged out successfully",
    )))
}

/// POST /api/v1/auth/forgot-password
///
/// Always answers with the same text; whether the email exists is not
/// observable from outside. The reset token travels out-of-band.
pub async fn forgot_password(
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    if let Err(e) = service.forgot_password(&payload.email) {
        tracing::warn!("Forgot-password processing failed: {e}");
    }
    Ok(AppResponse::ok(MessageResponse::new(
        "If that email address is registered, a reset link has been sent",
    )))
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    service.reset_password(&payload.token, &payload.password)?;
    Ok(AppResponse::ok(MessageResponse::new(
        "Password has been reset",
    )))
}

/// GET /api/v1/auth/me
pub async fn me(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
) -> Result<AppResponse<UserResponse>, AppError> {
    let user = service.get_current_user(claims.sub)?;
    Ok(AppResponse::ok(user))
}
