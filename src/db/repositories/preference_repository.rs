use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::preference::{NewUserPreference, UpdateUserPreference, UserPreference};
use crate::db::schema::user_preferences;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub struct PreferenceRepository;

impl PreferenceRepository {
    pub fn find_by_user(user_id: Uuid) -> Result<Option<UserPreference>, RepositoryError> {
        let mut conn = get_connection()?;

        user_preferences::table
            .filter(user_preferences::user_id.eq(user_id))
            .first::<UserPreference>(&mut conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn create(prefs: &NewUserPreference) -> Result<UserPreference, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(user_preferences::table)
            .values(prefs)
            .get_result::<UserPreference>(&mut conn)
            .map_err(Into::into)
    }

    pub fn update(
        user_id: Uuid,
        changes: &UpdateUserPreference,
    ) -> Result<UserPreference, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(user_preferences::table.filter(user_preferences::user_id.eq(user_id)))
            .set((changes, user_preferences::updated_at.eq(Utc::now())))
            .get_result::<UserPreference>(&mut conn)
            .map_err(Into::into)
    }
}
