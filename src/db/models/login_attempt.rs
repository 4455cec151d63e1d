use crate::db::schema::login_attempts;
use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use ipnetwork::IpNetwork;
use uuid::Uuid;

/// Append-only audit row. `user_id` stays empty for attempts against
/// unknown accounts.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = login_attempts)]
pub struct NewLoginAttempt {
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
    pub ip_address: IpNetwork,
    pub user_agent: Option<String>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = login_attempts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LoginAttempt {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub success: bool,
    pub failure_reason: Option<String>,
    pub ip_address: IpNetwork,
    pub user_agent: Option<String>,
    pub attempted_at: DateTime<Utc>,
}
