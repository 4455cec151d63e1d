// src/handlers/user.rs

use axum::extract::{Path, Query, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::extractors::AuthClaims;
use crate::auth::services::AuthService;
use crate::dto::requests::{
    ActivityListQuery, ChangePasswordRequest, CreatePreferencesRequest, UpdatePreferencesRequest,
    UpdateProfileRequest,
};
use crate::dto::responses::{
    ActivityResponse, MessageResponse, NotificationResponse, PreferenceResponse, ProfileResponse,
};
use crate::error::AppError;
use crate::response::AppResponse;

/// GET /api/v1/auth/profile
pub async fn get_profile(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
) -> Result<AppResponse<ProfileResponse>, AppError> {
    let profile = service.get_profile(claims.sub)?;
    Ok(AppResponse::ok(profile))
}

/// PUT /api/v1/auth/profile
pub async fn update_profile(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<AppResponse<ProfileResponse>, AppError> {
    let profile = service.update_profile(claims.sub, payload)?;
    Ok(AppResponse::ok(profile))
}

/// POST /api/v1/auth/change-password
pub async fn change_password(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    service.change_password(claims.sub, &payload)?;
    Ok(AppResponse::ok(MessageResponse::new(
        "Password changed successfully",
    )))
}

/// DELETE /api/v1/auth/account
pub async fn delete_account(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    service.delete_account(claims.sub)?;
    Ok(AppResponse::ok(MessageResponse::new("Account deleted")))
}

/// GET /api/v1/auth/preferences
pub async fn get_preferences(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
) -> Result<AppResponse<PreferenceResponse>, AppError> {
    let prefs = service.get_preferences(claims.sub)?;
    Ok(AppResponse::ok(prefs))
}

/// POST /api/v1/auth/preferences
pub async fn create_preferences(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<CreatePreferencesRequest>,
) -> Result<AppResponse<PreferenceResponse>, AppError> {
    let prefs = service.create_preferences(claims.sub, payload)?;
    Ok(AppResponse::created(prefs))
}

/// PUT /api/v1/auth/preferences
pub async fn update_preferences(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> Result<AppResponse<PreferenceResponse>, AppError> {
    let prefs = service.update_preferences(claims.sub, payload)?;
    Ok(AppResponse::ok(prefs))
}

/// GET /api/v1/auth/activities?limit=&offset=
pub async fn list_activities(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
    Query(query): Query<ActivityListQuery>,
) -> Result<AppResponse<Vec<ActivityResponse>>, AppError> {
    let activities = service.list_activities(
        claims.sub,
        query.limit.unwrap_or(0),
        query.offset.unwrap_or(0),
    )?;
    Ok(AppResponse::ok(activities))
}

/// GET /api/v1/auth/notifications
pub async fn list_notifications(
    claims: AuthClaims,
    State(service): State<Arc<AuthService>>,
) -> Result<AppResponse<Vec<NotificationResponse>>, AppError> {
    let notifications = service.list_notifications(claims.sub)?;
    Ok(AppResponse::ok(notifications))
}

/// PUT /api/v1/auth/notifications/{id}/read
pub async fn mark_notification_read(
    claims: AuthClaims,
    Path(notification_id): Path<Uuid>,
    State(service): State<Arc<AuthService>>,
) -> Result<AppResponse<MessageResponse>, AppError> {
    service.mark_notification_read(claims.sub, notification_id)?;
    Ok(AppResponse::ok(MessageResponse::new(
        "Notification marked as read",
    )))
}
