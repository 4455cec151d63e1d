use crate::db::schema::user_notifications;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use uuid::Uuid;

pub const NOTIFICATION_KINDS: [&str; 7] = [
    "info",
    "warning",
    "error",
    "success",
    "promotion",
    "reminder",
    "system",
];

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_notifications)]
pub struct NewUserNotification {
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: Option<String>,
    pub action_url: Option<String>,
    pub action_text: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = user_notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserNotification {
    pub id: Uuid,
    pub user_id: Uuid,
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
