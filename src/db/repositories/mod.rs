pub mod activity_repository;
pub mod login_attempt_repository;
pub mod notification_repository;
pub mod password_reset_repository;
pub mod preference_repository;
pub mod session_repository;
pub mod user_repository;
