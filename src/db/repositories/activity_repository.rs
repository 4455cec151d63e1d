use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::activity::{NewUserActivity, UserActivity};
use crate::db::schema::user_activities;
use diesel::prelude::*;
use uuid::Uuid;

/// Page size applied when the caller asks for 0 or more than the cap.
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 100;
pub const MAX_ACTIVITY_LIMIT: i64 = 1000;
pub const MAX_ACTION_LENGTH: usize = 100;

pub struct ActivityRepository;

impl ActivityRepository {
    pub fn create(activity: &NewUserActivity) -> Result<UserActivity, RepositoryError> {
        if activity.action.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "Activity action is required".to_string(),
            ));
        }
        if activity.action.len() > MAX_ACTION_LENGTH {
            return Err(RepositoryError::InvalidArgument(format!(
                "Activity action exceeds maximum length of {MAX_ACTION_LENGTH} characters"
            )));
        }

        let mut conn = get_connection()?;

        diesel::insert_into(user_activities::table)
            .values(activity)
            .get_result::<UserActivity>(&mut conn)
            .map_err(Into::into)
    }

    /// Newest first. `limit` of 0 or beyond the cap falls back to the
    /// default page size; negative pagination is rejected.
    pub fn list(
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserActivity>, RepositoryError> {
        if limit < 0 {
            return Err(RepositoryError::InvalidArgument(
                "Limit cannot be negative".to_string(),
            ));
        }
        if offset < 0 {
            return Err(RepositoryError::InvalidArgument(
                "Offset cannot be negative".to_string(),
            ));
        }

        let limit = normalize_limit(limit);

        let mut conn = get_connection()?;

        user_activities::table
            .filter(user_activities::user_id.eq(user_id))
            .order_by(user_activities::created_at.desc())
            .limit(limit)
            .offset(offset)
            .load::<UserActivity>(&mut conn)
            .map_err(Into::into)
    }
}

fn normalize_limit(limit: i64) -> i64 {
    if limit == 0 || limit > MAX_ACTIVITY_LIMIT {
        DEFAULT_ACTIVITY_LIMIT
    } else {
        limit
    }
}
