use crate::db::connection::get_connection;
use crate::db::error::RepositoryError;
use crate::db::models::notification::{NewUserNotification, UserNotification};
use crate::db::schema::user_notifications;
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

pub const MAX_KIND_LENGTH: usize = 50;
pub const MAX_TITLE_LENGTH: usize = 200;

pub struct NotificationRepository;

impl NotificationRepository {
    pub fn create(
        notification: &NewUserNotification,
    ) -> Result<UserNotification, RepositoryError> {
        if notification.kind.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "Notification type is required".to_string(),
            ));
        }
        if notification.kind.len() > MAX_KIND_LENGTH {
            return Err(RepositoryError::InvalidArgument(format!(
                "Notification type exceeds maximum length of {MAX_KIND_LENGTH} characters"
            )));
        }
        if !crate::db::models::notification::NOTIFICATION_KINDS
            .contains(&notification.kind.as_str())
        {
            return Err(RepositoryError::InvalidArgument(format!(
                "Unknown notification type: {}",
                notification.kind
            )));
        }
        if notification.title.is_empty() {
            return Err(RepositoryError::InvalidArgument(
                "Notification title is required".to_string(),
            ));
        }
        if notification.title.len() > MAX_TITLE_LENGTH {
            return Err(RepositoryError::InvalidArgument(format!(
                "Notification title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
            )));
        }

        let mut conn = get_connection()?;

        diesel::insert_into(user_notifications::table)
            .values(notification)
            .get_result::<UserNotification>(&mut conn)
            .map_err(Into::into)
    }

    /// Unexpired notifications, newest first.
    pub fn list(user_id: Uuid) -> Result<Vec<UserNotification>, RepositoryError> {
        let mut conn = get_connection()?;

        user_notifications::table
            .filter(user_notifications::user_id.eq(user_id))
            .filter(
                user_notifications::expires_at
                    .is_null()
                    .or(user_notifications::expires_at.gt(Utc::now())),
            )
            .order_by(user_notifications::created_at.desc())
            .load::<UserNotification>(&mut conn)
            .map_err(Into::into)
    }

    /// Sets `is_read`/`read_at`, but only on a row owned by `user_id`.
    /// Marking an already-read notification again is not an error.
    pub fn mark_read(user_id: Uuid, notification_id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = get_connection()?;

        let updated = diesel::update(
            user_notifications::table
                .filter(user_notifications::id.eq(notification_id))
                .filter(user_notifications::user_id.eq(user_id)),
        )
        .set((
            user_notifications::is_read.eq(true),
            user_notifications::read_at.eq(Some(Utc::now())),
        ))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(
                "Notification not found or does not belong to user".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_test_pool;
    use crate::db::models::user::{NewUser, UserRole};
    use crate::db::repositories::user_repository::UserRepository;

    fn create_test_user() -> Uuid {
        init_test_pool();

        let unique = Uuid::new_v4();
        let new_user = NewUser {
            email: format!("notif_test_{unique}@example.com"),
            username: format!("notif_user_{unique}"),
            password_hash: "test_hash".to_string(),
            role: UserRole::User,
            is_active: true,
            email_verified: false,
            first_name: None,
            last_name: None,
            phone_number: None,
        };

        UserRepository::create(&new_user)
            .expect("Failed to create test user")
            .id
    }

    fn notification(user_id: Uuid, title: &str) -> NewUserNotification {
        NewUserNotification {
            user_id,
            kind: "info".to_string(),
            title: title.to_string(),
            message: None,
            action_url: None,
            action_text: None,
            expires_at: None,
        }
    }

    #[test]
    fn create_validates_kind_and_title() {
        let user_id = create_test_user();

        let mut bad = notification(user_id, "ok");
        bad.kind = String::new();
        assert!(NotificationRepository::create(&bad).is_err());

        let mut long_title = notification(user_id, "ok");
        long_title.title = "t".repeat(MAX_TITLE_LENGTH + 1);
        assert!(NotificationRepository::create(&long_title).is_err());

        let _ = UserRepository::hard_delete(user_id);
    }

    #[test]
    fn expired_notifications_are_filtered_out() {
        let user_id = create_test_user();

        NotificationRepository::create(&notification(user_id, "fresh")).expect("create fresh");

        let mut expired = notification(user_id, "stale");
        expired.expires_at = Some(Utc::now() - chrono::Duration::minutes(1));
        NotificationRepository::create(&expired).expect("create expired");

        let visible = NotificationRepository::list(user_id).expect("list");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "fresh");

        let _ = UserRepository::hard_delete(user_id);
    }

    #[test]
    fn mark_read_is_owner_checked_and_idempotent() {
        let user_id = create_test_user();
        let other_id = create_test_user();

        let created =
            NotificationRepository::create(&notification(user_id, "readable")).expect("create");

        // Someone else's notification is unreachable.
        assert!(matches!(
            NotificationRepository::mark_read(other_id, created.id),
            Err(RepositoryError::NotFound(_))
        ));

        NotificationRepository::mark_read(user_id, created.id).expect("first read");
        // Second call is a harmless repeat.
        NotificationRepository::mark_read(user_id, created.id).expect("second read");

        let listed = NotificationRepository::list(user_id).expect("list");
        assert!(listed[0].is_read);
        assert!(listed[0].read_at.is_some());

        let _ = UserRepository::hard_delete(user_id);
        let _ = UserRepository::hard_delete(other_id);
    }
}
