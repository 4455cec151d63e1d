use crate::db::models::activity::UserActivity;
use crate::db::models::notification::UserNotification;
use crate::db::models::preference::UserPreference;
use crate::db::models::user::{User, UserRole};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Public view of a user; never carries secrets or lockout state.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Body of the forward-auth verify endpoint. On failure only `valid` is
/// populated; the reason stays server-side.
#[derive(Serialize, Debug, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl VerifyResponse {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            user_id: None,
            role: None,
            email: None,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub language: String,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        ProfileResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            bio: user.bio,
            avatar_url: user.avatar_url,
            date_of_birth: user.date_of_birth,
            gender: user.gender,
            country: user.country,
            city: user.city,
            timezone: user.timezone,
            language: user.language,
            website: user.website,
            linkedin: user.linkedin,
            twitter: user.twitter,
            github: user.github,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct PreferenceResponse {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub marketing_emails: bool,
    pub two_factor_enabled: bool,
    pub theme: String,
    pub language: String,
    pub privacy_level: String,
    pub updated_at: DateTime<Utc>,
}

impl From<UserPreference> for PreferenceResponse {
    fn from(prefs: UserPreference) -> Self {
        PreferenceResponse {
            email_notifications: prefs.email_notifications,
            push_notifications: prefs.push_notifications,
            marketing_emails: prefs.marketing_emails,
            two_factor_enabled: prefs.two_factor_enabled,
            theme: prefs.theme,
            language: prefs.language,
            privacy_level: prefs.privacy_level,
            updated_at: prefs.updated_at,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct ActivityResponse {
    pub id: Uuid,
    pub action: String,
    pub description: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<UserActivity> for ActivityResponse {
    fn from(activity: UserActivity) -> Self {
        ActivityResponse {
            id: activity.id,
            action: activity.action,
            description: activity.description,
            metadata: activity.metadata,
            created_at: activity.created_at,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserNotification> for NotificationResponse {
    fn from(n: UserNotification) -> Self {
        NotificationResponse {
            id: n.id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            read_at: n.read_at,
            action_url: n.action_url,
            action_text: n.action_text,
            expires_at: n.expires_at,
            created_at: n.created_at,
        }
    }
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public error body of the API
#[derive(Debug, Serialize, Clone, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
