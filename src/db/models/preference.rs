use crate::db::schema::user_preferences;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use uuid::Uuid;

pub const THEMES: [&str; 3] = ["light", "dark", "auto"];
pub const PRIVACY_LEVELS: [&str; 3] = ["private", "normal", "public"];

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_preferences)]
pub struct NewUserPreference {
    pub user_id: Uuid,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub marketing_emails: bool,
    pub two_factor_enabled: bool,
    pub theme: String,
    pub language: String,
    pub privacy_level: String,
}

impl NewUserPreference {
    /// Database-aligned defaults for a user without stored preferences.
    pub fn defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            email_notifications: true,
            push_notifications: true,
            marketing_emails: false,
            two_factor_enabled: false,
            theme: "light".to_string(),
            language: "en".to_string(),
            privacy_level: "normal".to_string(),
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = user_preferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub marketing_emails: bool,
    pub two_factor_enabled: bool,
    pub theme: String,
    pub language: String,
    pub privacy_level: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = user_preferences)]
pub struct UpdateUserPreference {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub marketing_emails: Option<bool>,
    pub two_factor_enabled: Option<bool>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub privacy_level: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
