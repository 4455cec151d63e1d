pub mod activity;
pub mod login_attempt;
pub mod notification;
pub mod password_reset;
pub mod preference;
pub mod session;
pub mod user;
