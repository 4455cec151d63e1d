use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::login_attempt::{LoginAttempt, NewLoginAttempt};
use crate::db::schema::login_attempts;
use diesel::prelude::*;
use uuid::Uuid;

pub struct LoginAttemptRepository;

impl LoginAttemptRepository {
    /// Appends an audit row. Succeeds unless storage is unavailable.
    pub fn create(attempt: &NewLoginAttempt) -> Result<LoginAttempt, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(login_attempts::table)
            .values(attempt)
            .get_result::<LoginAttempt>(&mut conn)
            .map_err(Into::into)
    }

    pub fn find_recent_by_user(
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<LoginAttempt>, RepositoryError> {
        let mut conn = get_connection()?;

        login_attempts::table
            .filter(login_attempts::user_id.eq(user_id))
            .order_by(login_attempts::attempted_at.desc())
            .limit(limit)
            .load::<LoginAttempt>(&mut conn)
            .map_err(Into::into)
    }
}
