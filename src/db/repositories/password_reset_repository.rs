use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::password_reset::{NewPasswordReset, PasswordReset};
use crate::db::schema::password_resets;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct PasswordResetRepository;

impl PasswordResetRepository {
    pub fn create(reset: &NewPasswordReset) -> Result<PasswordReset, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(password_resets::table)
            .values(reset)
            .get_result::<PasswordReset>(&mut conn)
            .map_err(Into::into)
    }

    /// Finds an unconsumed, unexpired reset by token fingerprint.
    pub fn find_usable_by_token_hash(
        token_hash: &str,
    ) -> Result<Option<PasswordReset>, RepositoryError> {
        let mut conn = get_connection()?;

        password_resets::table
            .filter(password_resets::token_hash.eq(token_hash))
            .filter(password_resets::used_at.is_null())
            .filter(password_resets::expires_at.gt(Utc::now()))
            .first::<PasswordReset>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    /// Consumes a reset exactly once: the guard on `used_at IS NULL` makes
    /// a second consumption report zero rows.
    pub fn consume(id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = get_connection()?;

        let updated = diesel::update(
            password_resets::table
                .filter(password_resets::id.eq(id))
                .filter(password_resets::used_at.is_null()),
        )
        .set(password_resets::used_at.eq(Some(Utc::now())))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }

    /// Outstanding (unconsumed, unexpired) resets for a user; backs the
    /// forgot-password rate limit.
    pub fn count_outstanding(user_id: Uuid) -> Result<i64, RepositoryError> {
        let mut conn = get_connection()?;

        password_resets::table
            .filter(password_resets::user_id.eq(user_id))
            .filter(password_resets::used_at.is_null())
            .filter(password_resets::expires_at.gt(Utc::now()))
            .count()
            .get_result(&mut conn)
            .map_err(Into::into)
    }
}
