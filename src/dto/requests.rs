use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

// -------- REQUEST DTOs --------

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String, // Plain text
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String, // Plain text
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Deserialize, Debug, Clone, Default, ToSchema)]
pub struct VerifyTokenRequest {
    pub token: Option<String>,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Allowlisted profile fields; anything else sent by a client simply has
/// nowhere to land.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CreatePreferencesRequest {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub marketing_emails: Option<bool>,
    pub two_factor_enabled: Option<bool>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub privacy_level: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdatePreferencesRequest {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub marketing_emails: Option<bool>,
    pub two_factor_enabled: Option<bool>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub privacy_level: Option<String>,
}

/// Query string for `GET /auth/activities`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ActivityListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
