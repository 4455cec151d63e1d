use crate::db::schema::user_activities;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use ipnetwork::IpNetwork;
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_activities)]
pub struct NewUserActivity {
    pub user_id: Uuid,
    pub action: String,
    pub description: Option<String>,
    pub ip_address: Option<IpNetwork>,
    pub user_agent: Option<String>,
    pub metadata: serde_json::Value,
}

impl NewUserActivity {
    pub fn new(user_id: Uuid, action: impl Into<String>) -> Self {
        Self {
            user_id,
            action: action.into(),
            description: None,
            ip_address: None,
            user_agent: None,
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = user_activities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserActivity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub description: Option<String>,
    pub ip_address: Option<IpNetwork>,
    pub user_agent: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
