use crate::db::schema::sessions;
use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use ipnetwork::IpNetwork;
use uuid::Uuid;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub user_id: Uuid,
    // The sessions.refresh_token column holds the token's SHA-256
    // fingerprint; the secret itself never reaches storage.
    #[diesel(column_name = refresh_token)]
    pub refresh_token_hash: String,
    pub access_token_hash: Option<String>,
    pub ip_address: Option<IpNetwork>,
    pub user_agent: Option<String>,
    pub device_info: Option<serde_json::Value>,
    pub is_active: bool,
    pub is_revoked: bool,
    pub expires_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[diesel(column_name = refresh_token)]
    pub refresh_token_hash: String,
    pub access_token_hash: Option<String>,
    pub ip_address: Option<IpNetwork>,
    pub user_agent: Option<String>,
    pub device_info: Option<serde_json::Value>,
    pub is_active: bool,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A session is usable iff not revoked, still active and unexpired.
    pub fn is_valid(&self) -> bool {
        self.is_active && !self.is_revoked && self.expires_at > Utc::now()
    }
}

#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = sessions)]
pub struct UpdateSession {
    #[diesel(column_name = refresh_token)]
    pub refresh_token_hash: Option<String>,
    pub access_token_hash: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_in_secs: i64, revoked: bool, active: bool) -> Session {
        Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            refresh_token_hash: "h".repeat(64),
            access_token_hash: None,
            ip_address: None,
            user_agent: None,
            device_info: None,
            is_active: active,
            is_revoked: revoked,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_secs),
            last_used_at: None,
        }
    }

    #[test]
    fn validity_requires_unexpired_unrevoked_active() {
        assert!(session(60, false, true).is_valid());
        assert!(!session(60, true, true).is_valid());
        assert!(!session(60, false, false).is_valid());
        assert!(!session(-1, false, true).is_valid());
    }
}
