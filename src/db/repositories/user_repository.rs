use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::login_attempt::{LoginAttempt, NewLoginAttempt};
use crate::db::models::user::{NewUser, ProfileChanges, UpdateUser, User};
use crate::db::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use ipnetwork::IpNetwork;
use uuid::Uuid;

/// Providers with a dedicated external-id column on the users table.
const OAUTH_PROVIDERS: [&str; 3] = ["google", "github", "facebook"];

pub struct UserRepository;

impl UserRepository {
    pub fn create(new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::insert_into(users::table)
            .values(new_user)
            .get_result::<User>(&mut conn)
            .map_err(Into::into)
    }

    pub fn find_by_id(id: Uuid, active_only: bool) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        let mut query = users::table
            .filter(users::id.eq(id))
            .filter(users::deleted_at.is_null())
            .into_boxed();
        if active_only {
            query = query.filter(users::is_active.eq(true));
        }

        query.first::<User>(&mut conn).optional().map_err(Into::into)
    }

    /// Lookup by exact (already normalized) email among non-deleted users.
    pub fn find_by_email(email: &str, active_only: bool) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        let mut query = users::table
            .filter(users::email.eq(email))
            .filter(users::deleted_at.is_null())
            .into_boxed();
        if active_only {
            query = query.filter(users::is_active.eq(true));
        }

        query.first::<User>(&mut conn).optional().map_err(Into::into)
    }

    pub fn find_by_username(
        username: &str,
        active_only: bool,
    ) -> Result<Option<User>, RepositoryError> {
        let mut conn = get_connection()?;

        let mut query = users::table
            .filter(users::username.eq(username))
            .filter(users::deleted_at.is_null())
            .into_boxed();
        if active_only {
            query = query.filter(users::is_active.eq(true));
        }

        query.first::<User>(&mut conn).optional().map_err(Into::into)
    }

    /// Lookup by external identity. Unknown providers are rejected, not
    /// treated as "not found".
    pub fn find_by_external_id(
        provider: &str,
        external_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        if !OAUTH_PROVIDERS.contains(&provider) {
            return Err(RepositoryError::InvalidArgument(format!(
                "Unsupported OAuth provider: {provider}"
            )));
        }

        let mut conn = get_connection()?;

        let base = users::table
            .filter(users::deleted_at.is_null())
            .filter(users::is_active.eq(true));

        let user = match provider {
            "google" => base
                .filter(users::google_id.eq(external_id))
                .first::<User>(&mut conn)
                .optional()?,
            "github" => base
                .filter(users::git_hub_id.eq(external_id))
                .first::<User>(&mut conn)
                .optional()?,
            _ => base
                .filter(users::facebook_id.eq(external_id))
                .first::<User>(&mut conn)
                .optional()?,
        };

        Ok(user)
    }

    pub fn update(id: Uuid, changes: &UpdateUser) -> Result<User, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set(changes)
            .get_result::<User>(&mut conn)
            .map_err(Into::into)
    }

    pub fn update_password(id: Uuid, new_password_hash: &str) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::password_hash.eq(new_password_hash),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    /// Applies an allowlisted profile changeset to an active user.
    pub fn update_profile(id: Uuid, changes: &ProfileChanges) -> Result<User, RepositoryError> {
        if changes.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "No valid fields to update".to_string(),
            ));
        }

        let existing = Self::find_by_id(id, true)?;
        if existing.is_none() {
            return Err(RepositoryError::NotFound("User not found".to_string()));
        }

        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set((changes, users::updated_at.eq(Utc::now())))
            .get_result::<User>(&mut conn)
            .map_err(Into::into)
    }

    /// Soft delete: the row stays behind with `deleted_at` set and drops out
    /// of every active-path query.
    pub fn soft_delete(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::deleted_at.eq(Some(Utc::now())))
            .execute(&mut conn)?;

        Ok(())
    }

    /// Hard delete; dependent rows go via ON DELETE CASCADE.
    pub fn hard_delete(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::delete(users::table.filter(users::id.eq(id))).execute(&mut conn)?;

        Ok(())
    }

    pub fn update_last_login(id: Uuid, ip: IpNetwork) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::last_login_at.eq(Some(Utc::now())),
                users::last_login_ip.eq(Some(ip)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    /// SQL-side increment so concurrent failed logins on the same account
    /// never lose updates. Returns the post-increment counter.
    pub fn increment_failed_attempts(id: Uuid) -> Result<i32, RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::failed_login_attempts.eq(users::failed_login_attempts + 1))
            .returning(users::failed_login_attempts)
            .get_result::<i32>(&mut conn)
            .map_err(Into::into)
    }

    pub fn lock_until(id: Uuid, until: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::locked_until.eq(Some(until)))
            .execute(&mut conn)?;

        Ok(())
    }

    pub fn reset_failed_attempts(id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::failed_login_attempts.eq(0),
                users::locked_until.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    pub fn create_login_attempt(
        attempt: &NewLoginAttempt,
    ) -> Result<LoginAttempt, RepositoryError> {
        super::login_attempt_repository::LoginAttemptRepository::create(attempt)
    }

    pub fn is_email_taken(email: &str) -> Result<bool, RepositoryError> {
        let mut conn = get_connection()?;

        let count: i64 = users::table
            .filter(users::email.eq(email))
            .filter(users::deleted_at.is_null())
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }

    pub fn is_username_taken(username: &str) -> Result<bool, RepositoryError> {
        let mut conn = get_connection()?;

        let count: i64 = users::table
            .filter(users::username.eq(username))
            .filter(users::deleted_at.is_null())
            .count()
            .get_result(&mut conn)?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_test_pool;
    use crate::db::models::user::UserRole;

    fn test_user(suffix: &str) -> NewUser {
        init_test_pool();

        let unique = Uuid::new_v4();
        NewUser {
            email: format!("test_{suffix}_{unique}@example.com"),
            username: format!("testuser_{suffix}_{unique}"),
            password_hash: "test_hash".to_string(),
            role: UserRole::User,
            is_active: true,
            email_verified: false,
            first_name: None,
            last_name: None,
            phone_number: None,
        }
    }

    #[test]
    fn create_and_find_by_email() {
        let new_user = test_user("find_email");
        let created = UserRepository::create(&new_user).expect("create user");

        let found = UserRepository::find_by_email(&new_user.email, true)
            .expect("query")
            .expect("user exists");
        assert_eq!(found.id, created.id);
        assert_eq!(found.role, UserRole::User);
        assert_eq!(found.failed_login_attempts, 0);

        let _ = UserRepository::hard_delete(created.id);
    }

    #[test]
    fn soft_deleted_user_disappears_from_lookups() {
        let new_user = test_user("soft_delete");
        let created = UserRepository::create(&new_user).expect("create user");

        UserRepository::soft_delete(created.id).expect("soft delete");

        assert!(UserRepository::find_by_id(created.id, false)
            .expect("query")
            .is_none());
        assert!(!UserRepository::is_email_taken(&new_user.email).expect("query"));

        let _ = UserRepository::hard_delete(created.id);
    }

    #[test]
    fn increment_failed_attempts_returns_post_value() {
        let new_user = test_user("lockout");
        let created = UserRepository::create(&new_user).expect("create user");

        for expected in 1..=5 {
            let n = UserRepository::increment_failed_attempts(created.id).expect("increment");
            assert_eq!(n, expected);
        }

        UserRepository::lock_until(created.id, Utc::now() + chrono::Duration::minutes(15))
            .expect("lock");
        let locked = UserRepository::find_by_id(created.id, false)
            .expect("query")
            .expect("exists");
        assert!(locked.is_locked());

        UserRepository::reset_failed_attempts(created.id).expect("reset");
        let reset = UserRepository::find_by_id(created.id, false)
            .expect("query")
            .expect("exists");
        assert_eq!(reset.failed_login_attempts, 0);
        assert!(reset.locked_until.is_none());

        let _ = UserRepository::hard_delete(created.id);
    }

    #[test]
    fn update_profile_rejects_empty_changeset() {
        let new_user = test_user("profile_empty");
        let created = UserRepository::create(&new_user).expect("create user");

        let result = UserRepository::update_profile(created.id, &ProfileChanges::default());
        assert!(matches!(result, Err(RepositoryError::InvalidArgument(_))));

        let _ = UserRepository::hard_delete(created.id);
    }

    #[test]
    fn update_profile_applies_allowlisted_fields_only() {
        let new_user = test_user("profile");
        let created = UserRepository::create(&new_user).expect("create user");
        let original_hash = created.password_hash.clone();

        let changes = ProfileChanges {
            bio: Some("systems plumber".to_string()),
            city: Some("Nantes".to_string()),
            ..Default::default()
        };
        let updated = UserRepository::update_profile(created.id, &changes).expect("update");

        assert_eq!(updated.bio.as_deref(), Some("systems plumber"));
        assert_eq!(updated.city.as_deref(), Some("Nantes"));
        // Credentials are not reachable through a profile update.
        assert_eq!(updated.password_hash, original_hash);

        let _ = UserRepository::hard_delete(created.id);
    }

    #[test]
    fn external_id_lookup_rejects_unknown_provider() {
        init_test_pool();
        let result = UserRepository::find_by_external_id("myspace", "123");
        assert!(matches!(result, Err(RepositoryError::InvalidArgument(_))));
    }

    #[test]
    fn duplicate_email_violates_unique_constraint() {
        let new_user = test_user("duplicate");
        let created = UserRepository::create(&new_user).expect("create first");

        let mut second = new_user.clone();
        second.username = format!("other_{}", Uuid::new_v4());
        let result = UserRepository::create(&second);
        assert!(matches!(result, Err(RepositoryError::UniqueViolation(_))));

        let _ = UserRepository::hard_delete(created.id);
    }
}
