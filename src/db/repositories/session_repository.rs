use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::session::{NewSession, Session, UpdateSession};
use crate::db::schema::sessions;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct SessionRepository;

impl SessionRepository {
    pub fn create(new_session: &NewSession) -> Result<Session, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(sessions::table)
            .values(new_session)
            .get_result::<Session>(&mut conn)
            .map_err(Into::into)
    }

    /// Lookup by refresh-token fingerprint, revoked or not. Callers decide
    /// what revocation means for their flow.
    pub fn find_by_refresh_token_hash(hash: &str) -> Result<Option<Session>, RepositoryError> {
        let mut conn = get_connection()?;

        sessions::table
            .filter(sessions::refresh_token.eq(hash))
            .first::<Session>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn update(id: Uuid, changes: &UpdateSession) -> Result<Session, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(sessions::table.filter(sessions::id.eq(id)))
            .set((changes, sessions::updated_at.eq(Utc::now())))
            .get_result::<Session>(&mut conn)
            .map_err(Into::into)
    }

    pub fn revoke(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(sessions::table.filter(sessions::id.eq(id)))
            .set((
                sessions::is_revoked.eq(true),
                sessions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    pub fn revoke_all_for_user(user_id: Uuid) -> Result<usize, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(sessions::table.filter(sessions::user_id.eq(user_id)))
            .set((
                sessions::is_revoked.eq(true),
                sessions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .map_err(Into::into)
    }

    /// Hard-deletes expired or revoked sessions. Pure delete; running it
    /// twice equals running it once.
    pub fn cleanup_expired() -> Result<usize, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(
            sessions::table.filter(
                sessions::expires_at
                    .lt(Utc::now())
                    .or(sessions::is_revoked.eq(true)),
            ),
        )
        .execute(&mut conn)
        .map_err(Into::into)
    }
}
