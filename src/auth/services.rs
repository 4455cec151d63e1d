// src/auth/services.rs

use crate::error::AppError;

use crate::dto::requests::{
    ChangePasswordRequest, CreatePreferencesRequest, LoginRequest, RefreshTokenRequest,
    RegisterRequest, UpdatePreferencesRequest, UpdateProfileRequest,
};
use crate::dto::responses::{
    AuthResponse, PreferenceResponse, ProfileResponse, RefreshResponse, UserResponse,
    VerifyResponse,
};

use crate::db::models::activity::NewUserActivity;
use crate::db::models::login_attempt::NewLoginAttempt;
use crate::db::models::notification::NewUserNotification;
use crate::db::models::password_reset::NewPasswordReset;
use crate::db::models::preference::{
    NewUserPreference, PRIVACY_LEVELS, THEMES, UpdateUserPreference, UserPreference,
};
use crate::db::models::session::{NewSession, UpdateSession};
use crate::db::models::user::{NewUser, ProfileChanges, User, UserRole};

use crate::db::repositories::activity_repository::ActivityRepository;
use crate::db::repositories::notification_repository::NotificationRepository;
use crate::db::repositories::password_reset_repository::PasswordResetRepository;
use crate::db::repositories::preference_repository::PreferenceRepository;
use crate::db::repositories::session_repository::SessionRepository;
use crate::db::repositories::user_repository::UserRepository;

use crate::auth::jwt::{TokenPair, TokenSigner};
use crate::auth::password::PasswordManager;
use crate::cache::token_store::TokenStore;

use chrono::Utc;
use ipnetwork::IpNetwork;
use rand::RngCore;
use uuid::Uuid;

const MAX_FAILED_ATTEMPTS: i32 = 5;
const LOCKOUT_WINDOW_MINUTES: i64 = 15;
const RESET_TOKEN_BYTES: usize = 32;
const RESET_TOKEN_TTL_MINUTES: i64 = 60;
const MAX_OUTSTANDING_RESETS: i64 = 3;

pub struct AuthService {
    signer: TokenSigner,
    min_password_len: usize,
}

impl AuthService {
    pub fn new(signer: TokenSigner, min_password_len: usize) -> Self {
        Self {
            signer,
            min_password_len,
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Registers a new user account and issues its first token pair.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidEmail`] / [`AppError::WeakPassword`] on policy failures.
    /// - [`AppError::EmailTaken`] / [`AppError::UsernameTaken`] on conflicts.
    /// - Storage and hashing errors otherwise.
    pub fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        if !Self::is_valid_email(&req.email) {
            return Err(AppError::InvalidEmail);
        }
        if req.username.trim().is_empty() {
            return Err(AppError::validation("Username is required"));
        }
        if !PasswordManager::is_strong(&req.password, self.min_password_len) {
            return Err(AppError::WeakPassword(format!(
                "Password must be at least {} characters with uppercase, lowercase and numbers",
                self.min_password_len
            )));
        }

        let email = req.email.to_lowercase();
        if UserRepository::is_email_taken(&email)? {
            return Err(AppError::EmailTaken);
        }
        if UserRepository::is_username_taken(&req.username)? {
            return Err(AppError::UsernameTaken);
        }

        let password_hash =
            PasswordManager::hash(&req.password).map_err(AppError::hashing_failed)?;

        let new_user = NewUser {
            email,
            username: req.username,
            password_hash,
            role: UserRole::User,
            is_active: true,
            email_verified: false,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
        };

        let user = UserRepository::create(&new_user)?;

        let welcome = NewUserNotification {
            user_id: user.id,
            kind: "system".to_string(),
            title: "Welcome!".to_string(),
            message: Some("Your account has been created.".to_string()),
            action_url: None,
            action_text: None,
            expires_at: None,
        };
        let _ = NotificationRepository::create(&welcome)
            .inspect_err(|e| tracing::warn!("Failed to create welcome notification: {e}"));

        self.issue_tokens(&user)
    }

    /// Authenticates a user against its stored credentials.
    ///
    /// Every attempt lands in the audit log, successful or not. Lockout
    /// engages on the failing attempt that reaches the threshold.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidCredentials`] for unknown user or wrong password
    ///   (deliberately indistinguishable).
    /// - [`AppError::AccountInactive`] / [`AppError::AccountLocked`].
    /// - Storage errors otherwise.
    pub fn login(
        &self,
        req: &LoginRequest,
        ip: IpNetwork,
        user_agent: Option<String>,
    ) -> Result<AuthResponse, AppError> {
        let email = req.email.to_lowercase();

        let user = match UserRepository::find_by_email(&email, false)? {
            Some(user) => user,
            None => {
                Self::record_attempt(None, &email, false, Some("no_user"), ip, &user_agent);
                return Err(AppError::InvalidCredentials);
            }
        };

        if !user.is_active {
            Self::record_attempt(
                Some(user.id),
                &email,
                false,
                Some("inactive"),
                ip,
                &user_agent,
            );
            return Err(AppError::AccountInactive);
        }

        if user.is_locked() {
            Self::record_attempt(
                Some(user.id),
                &email,
                false,
                Some("locked"),
                ip,
                &user_agent,
            );
            return Err(AppError::AccountLocked);
        }

        let password_ok = PasswordManager::verify(&req.password, &user.password_hash)
            .map_err(AppError::hashing_failed)?;

        if !password_ok {
            let failed = UserRepository::increment_failed_attempts(user.id)?;
            if failed >= MAX_FAILED_ATTEMPTS {
                UserRepository::lock_until(
                    user.id,
                    Utc::now() + chrono::Duration::minutes(LOCKOUT_WINDOW_MINUTES),
                )?;
            }
            Self::record_attempt(
                Some(user.id),
                &email,
                false,
                Some("wrong_password"),
                ip,
                &user_agent,
            );
            return Err(AppError::InvalidCredentials);
        }

        UserRepository::reset_failed_attempts(user.id)?;
        UserRepository::update_last_login(user.id, ip)?;
        Self::record_attempt(Some(user.id), &email, true, None, ip, &user_agent);

        let pair = self.signer.issue_pair(&user)?;
        let refresh_hash = TokenSigner::hash_token(&pair.refresh_token);

        TokenStore::store_refresh_token(
            &refresh_hash,
            user.id,
            self.signer.refresh_ttl_secs() as u64,
        )?;

        let session = NewSession {
            user_id: user.id,
            refresh_token_hash: refresh_hash,
            access_token_hash: Some(TokenSigner::hash_token(&pair.access_token)),
            ip_address: Some(ip),
            user_agent,
            device_info: Some(serde_json::json!({})),
            is_active: true,
            is_revoked: false,
            expires_at: Utc::now() + chrono::Duration::seconds(self.signer.access_ttl_secs()),
        };
        SessionRepository::create(&session)?;

        Ok(Self::auth_response(pair, user))
    }

    /// Rotates a refresh token. At-most-once: the old record's single-shot
    /// delete decides the race, so a replayed token sees `RefreshNotFound`.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidRefreshToken`] on signature/type/expiry failure,
    ///   blacklisted hashes, or a user-id mismatch.
    /// - [`AppError::RefreshNotFound`] when the record is gone (already
    ///   rotated or expired).
    /// - [`AppError::AccountInactive`] when the owner was deactivated.
    pub fn refresh_token(&self, req: &RefreshTokenRequest) -> Result<RefreshResponse, AppError> {
        if req.refresh_token.is_empty() {
            return Err(AppError::InvalidRefreshToken);
        }

        let claims = self
            .signer
            .verify_refresh(&req.refresh_token)
            .map_err(|_| AppError::InvalidRefreshToken)?;

        let old_hash = TokenSigner::hash_token(&req.refresh_token);

        if TokenStore::is_token_blacklisted(&old_hash)? {
            return Err(AppError::InvalidRefreshToken);
        }

        let record = TokenStore::get_refresh_token(&old_hash)?.ok_or(AppError::RefreshNotFound)?;
        if record.user_id != claims.user_id {
            return Err(AppError::InvalidRefreshToken);
        }

        // A revoked session kills its refresh token even before the
        // ephemeral record expires (logout, password reset).
        let session = SessionRepository::find_by_refresh_token_hash(&old_hash)?;
        if session.as_ref().is_some_and(|s| s.is_revoked) {
            return Err(AppError::InvalidRefreshToken);
        }

        let user = UserRepository::find_by_id(record.user_id, false)?
            .ok_or(AppError::InvalidRefreshToken)?;
        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        // Single-shot delete: exactly one concurrent rotation of the same
        // token observes `true` here and gets to finish.
        if !TokenStore::delete_refresh_token(&old_hash)? {
            return Err(AppError::RefreshNotFound);
        }

        let pair = self.signer.issue_pair(&user)?;
        let new_hash = TokenSigner::hash_token(&pair.refresh_token);

        TokenStore::store_refresh_token(
            &new_hash,
            user.id,
            self.signer.refresh_ttl_secs() as u64,
        )?;

        if let Some(session) = session {
            let changes = UpdateSession {
                refresh_token_hash: Some(new_hash),
                access_token_hash: Some(Some(TokenSigner::hash_token(&pair.access_token))),
                expires_at: Some(
                    Utc::now() + chrono::Duration::seconds(self.signer.access_ttl_secs()),
                ),
                last_used_at: Some(Some(Utc::now())),
                ..Default::default()
            };
            let _ = SessionRepository::update(session.id, &changes)
                .inspect_err(|e| tracing::warn!("Failed to update session on rotation: {e}"));
        }

        Ok(RefreshResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type.to_string(),
            expires_in: pair.expires_in,
        })
    }

    /// Verifies an access token on behalf of a gateway. Never errors
    /// towards the caller: every failure, including ephemeral-store
    /// transport trouble, collapses to `valid: false`.
    pub fn verify_token(&self, token: &str) -> VerifyResponse {
        let claims = match self.signer.verify_access(token) {
            Ok(claims) => claims,
            Err(_) => return VerifyResponse::invalid(),
        };

        match TokenStore::is_token_blacklisted(&TokenSigner::hash_token(token)) {
            Ok(false) => {}
            // Blacklisted, or unknown because the store is unreachable.
            Ok(true) | Err(_) => return VerifyResponse::invalid(),
        }

        let user = match UserRepository::find_by_id(claims.user_id, true) {
            Ok(Some(user)) => user,
            Ok(None) | Err(_) => return VerifyResponse::invalid(),
        };

        VerifyResponse {
            valid: true,
            user_id: Some(user.id),
            role: Some(user.role),
            email: Some(user.email),
        }
    }

    /// Revokes the presented access token and every session of the user.
    /// Safe to repeat.
    pub fn logout(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        TokenStore::blacklist_token(
            &TokenSigner::hash_token(token),
            self.signer.access_ttl_secs() as u64,
        )?;
        SessionRepository::revoke_all_for_user(user_id)?;
        Ok(())
    }

    /// Changes the password after verifying the current one. Outstanding
    /// sessions stay valid; callers wanting a clean slate chain a logout.
    pub fn change_password(
        &self,
        user_id: Uuid,
        req: &ChangePasswordRequest,
    ) -> Result<(), AppError> {
        if !PasswordManager::is_strong(&req.new_password, self.min_password_len) {
            return Err(AppError::WeakPassword(format!(
                "Password must be at least {} characters with uppercase, lowercase and numbers",
                self.min_password_len
            )));
        }

        let user = UserRepository::find_by_id(user_id, true)?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let current_ok = PasswordManager::verify(&req.current_password, &user.password_hash)
            .map_err(AppError::hashing_failed)?;
        if !current_ok {
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = PasswordManager::hash(&req.new_password).map_err(AppError::hashing_failed)?;
        UserRepository::update_password(user_id, &new_hash)?;

        let activity = NewUserActivity::new(user_id, "password_changed")
            .with_description("Password changed via account settings");
        let _ = ActivityRepository::create(&activity)
            .inspect_err(|e| tracing::warn!("Failed to log password change: {e}"));

        Ok(())
    }

    /// Starts the password-reset flow. Always reports success so callers
    /// cannot probe which emails exist; minting is rate-limited per user.
    /// The returned token travels out-of-band and is never logged.
    pub fn forgot_password(&self, email: &str) -> Result<Option<String>, AppError> {
        let user = match UserRepository::find_by_email(&email.to_lowercase(), true)? {
            Some(user) => user,
            None => return Ok(None),
        };

        if PasswordResetRepository::count_outstanding(user.id)? >= MAX_OUTSTANDING_RESETS {
            tracing::warn!("Reset request rate-limited for user {}", user.id);
            return Ok(None);
        }

        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let reset = NewPasswordReset {
            user_id: user.id,
            token_hash: TokenSigner::hash_token(&token),
            expires_at: Utc::now() + chrono::Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        };
        PasswordResetRepository::create(&reset)?;
        tracing::debug!("Password reset token issued for user {}", user.id);

        Ok(Some(token))
    }

    /// Completes a reset: the token is single-use and bounded to one hour.
    /// All sessions are revoked afterwards.
    pub fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AppError> {
        if !PasswordManager::is_strong(new_password, self.min_password_len) {
            return Err(AppError::WeakPassword(format!(
                "Password must be at least {} characters with uppercase, lowercase and numbers",
                self.min_password_len
            )));
        }

        let reset = PasswordResetRepository::find_usable_by_token_hash(&TokenSigner::hash_token(
            token,
        ))?
        .ok_or_else(|| AppError::validation("Invalid or expired reset token"))?;

        // Consume first; losing this race means the token was already spent.
        if !PasswordResetRepository::consume(reset.id)? {
            return Err(AppError::validation("Invalid or expired reset token"));
        }

        let new_hash = PasswordManager::hash(new_password).map_err(AppError::hashing_failed)?;
        UserRepository::update_password(reset.user_id, &new_hash)?;
        SessionRepository::revoke_all_for_user(reset.user_id)?;

        Ok(())
    }

    /// Soft-deletes the account and revokes every session.
    pub fn delete_account(&self, user_id: Uuid) -> Result<(), AppError> {
        let user = UserRepository::find_by_id(user_id, false)?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        UserRepository::soft_delete(user.id)?;
        SessionRepository::revoke_all_for_user(user.id)?;
        Ok(())
    }

    pub fn get_current_user(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        UserRepository::find_by_id(user_id, true)?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub fn get_profile(&self, user_id: Uuid) -> Result<ProfileResponse, AppError> {
        UserRepository::find_by_id(user_id, true)?
            .map(ProfileResponse::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Applies the allowlisted profile changeset.
    pub fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<ProfileResponse, AppError> {
        let changes = ProfileChanges {
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            phone_number: req.phone_number,
            avatar_url: req.avatar_url,
            date_of_birth: req.date_of_birth,
            gender: req.gender,
            country: req.country,
            city: req.city,
            timezone: req.timezone,
            language: req.language,
            website: req.website,
            linkedin: req.linkedin,
            twitter: req.twitter,
            github: req.github,
        };

        let user = UserRepository::update_profile(user_id, &changes)?;

        let activity = NewUserActivity::new(user_id, "profile_updated");
        let _ = ActivityRepository::create(&activity)
            .inspect_err(|e| tracing::warn!("Failed to log profile update: {e}"));

        Ok(ProfileResponse::from(user))
    }

    // === Preferences ===

    pub fn get_preferences(&self, user_id: Uuid) -> Result<PreferenceResponse, AppError> {
        PreferenceRepository::find_by_user(user_id)?
            .map(PreferenceResponse::from)
            .ok_or_else(|| AppError::not_found("User preferences not found"))
    }

    pub fn create_preferences(
        &self,
        user_id: Uuid,
        req: CreatePreferencesRequest,
    ) -> Result<PreferenceResponse, AppError> {
        Self::validate_preference_labels(req.theme.as_deref(), req.privacy_level.as_deref())?;

        if PreferenceRepository::find_by_user(user_id)?.is_some() {
            return Err(AppError::duplicate("User preferences already exist"));
        }

        let mut prefs = NewUserPreference::defaults(user_id);
        if let Some(v) = req.email_notifications {
            prefs.email_notifications = v;
        }
        if let Some(v) = req.push_notifications {
            prefs.push_notifications = v;
        }
        if let Some(v) = req.marketing_emails {
            prefs.marketing_emails = v;
        }
        if let Some(v) = req.two_factor_enabled {
            prefs.two_factor_enabled = v;
        }
        if let Some(v) = req.theme {
            prefs.theme = v;
        }
        if let Some(v) = req.language {
            prefs.language = v;
        }
        if let Some(v) = req.privacy_level {
            prefs.privacy_level = v;
        }

        PreferenceRepository::create(&prefs)
            .map(PreferenceResponse::from)
            .map_err(Into::into)
    }

    /// Upsert semantics: creates defaults merged with the request when the
    /// user has no stored preferences yet.
    pub fn update_preferences(
        &self,
        user_id: Uuid,
        req: UpdatePreferencesRequest,
    ) -> Result<PreferenceResponse, AppError> {
        Self::validate_preference_labels(req.theme.as_deref(), req.privacy_level.as_deref())?;

        let existing: Option<UserPreference> = PreferenceRepository::find_by_user(user_id)?;
        if existing.is_none() {
            return self.create_preferences(
                user_id,
                CreatePreferencesRequest {
                    email_notifications: req.email_notifications,
                    push_notifications: req.push_notifications,
                    marketing_emails: req.marketing_emails,
                    two_factor_enabled: req.two_factor_enabled,
                    theme: req.theme,
                    language: req.language,
                    privacy_level: req.privacy_level,
                },
            );
        }

        let changes = UpdateUserPreference {
            email_notifications: req.email_notifications,
            push_notifications: req.push_notifications,
            marketing_emails: req.marketing_emails,
            two_factor_enabled: req.two_factor_enabled,
            theme: req.theme,
            language: req.language,
            privacy_level: req.privacy_level,
            updated_at: None,
        };

        PreferenceRepository::update(user_id, &changes)
            .map(PreferenceResponse::from)
            .map_err(Into::into)
    }

    // === Activities & notifications ===

    pub fn list_activities(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<crate::dto::responses::ActivityResponse>, AppError> {
        let activities = ActivityRepository::list(user_id, limit, offset)?;
        Ok(activities.into_iter().map(Into::into).collect())
    }

    pub fn list_notifications(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<crate::dto::responses::NotificationResponse>, AppError> {
        let notifications = NotificationRepository::list(user_id)?;
        Ok(notifications.into_iter().map(Into::into).collect())
    }

    pub fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> Result<(), AppError> {
        NotificationRepository::mark_read(user_id, notification_id).map_err(Into::into)
    }

    // === Helpers ===

    fn issue_tokens(&self, user: &User) -> Result<AuthResponse, AppError> {
        let pair = self.signer.issue_pair(user)?;
        let refresh_hash = TokenSigner::hash_token(&pair.refresh_token);

        TokenStore::store_refresh_token(
            &refresh_hash,
            user.id,
            self.signer.refresh_ttl_secs() as u64,
        )?;

        Ok(Self::auth_response(pair, user.clone()))
    }

    fn auth_response(pair: TokenPair, user: User) -> AuthResponse {
        AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type.to_string(),
            expires_in: pair.expires_in,
            user: UserResponse::from(user),
        }
    }

    fn record_attempt(
        user_id: Option<Uuid>,
        email: &str,
        success: bool,
        failure_reason: Option<&str>,
        ip: IpNetwork,
        user_agent: &Option<String>,
    ) {
        let attempt = NewLoginAttempt {
            user_id,
            email: Some(email.to_string()),
            username: None,
            success,
            failure_reason: failure_reason.map(str::to_string),
            ip_address: ip,
            user_agent: user_agent.clone(),
        };
        let _ = UserRepository::create_login_attempt(&attempt)
            .inspect_err(|e| tracing::warn!("Failed to log login attempt: {e}"));
    }

    fn validate_preference_labels(
        theme: Option<&str>,
        privacy_level: Option<&str>,
    ) -> Result<(), AppError> {
        if let Some(theme) = theme {
            if !THEMES.contains(&theme) {
                return Err(AppError::validation(format!("Unknown theme: {theme}")));
            }
        }
        if let Some(level) = privacy_level {
            if !PRIVACY_LEVELS.contains(&level) {
                return Err(AppError::validation(format!(
                    "Unknown privacy level: {level}"
                )));
            }
        }
        Ok(())
    }

    // === Helpers de validation ===

    fn is_valid_email(email: &str) -> bool {
        email.contains('@') && email.contains('.') && email.len() > 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::connection::init_test_cache;
    use crate::db::connection::init_test_pool;
    use crate::db::repositories::user_repository::UserRepository;

    fn make_service() -> AuthService {
        init_test_pool();
        init_test_cache();

        let signer = TokenSigner::new(
            "access_secret_for_service_tests",
            "refresh_secret_for_service_tests",
            "authd-tests",
            900,
            3600,
        );
        AuthService::new(signer, 8)
    }

    fn register_request() -> RegisterRequest {
        let unique = Uuid::new_v4();
        RegisterRequest {
            email: format!("svc+{unique}@example.com"),
            username: format!("svcuser_{unique}"),
            password: "TestPassword123!".to_string(),
            first_name: None,
            last_name: None,
            phone_number: None,
        }
    }

    fn test_ip() -> IpNetwork {
        "127.0.0.1/32".parse().expect("inet literal")
    }

    #[test]
    fn register_succeeds_and_tokens_verify() {
        let service = make_service();
        let req = register_request();
        let email = req.email.to_lowercase();

        let response = service.register(req).expect("registration");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.email, email);
        assert_eq!(response.user.role, UserRole::User);

        let claims = service
            .signer()
            .verify_access(&response.access_token)
            .expect("fresh access token verifies");
        assert_eq!(claims.user_id, response.user.id);

        let _ = UserRepository::hard_delete(response.user.id);
    }

    #[test]
    fn register_rejects_duplicate_email() {
        let service = make_service();
        let req = register_request();

        let first = service.register(req.clone()).expect("first registration");
        let second = service.register(req);
        assert!(matches!(second, Err(AppError::EmailTaken)));

        let _ = UserRepository::hard_delete(first.user.id);
    }

    #[test]
    fn register_rejects_weak_password() {
        let service = make_service();
        let mut req = register_request();
        req.password = "weak".to_string();

        assert!(matches!(
            service.register(req),
            Err(AppError::WeakPassword(_))
        ));
    }

    #[test]
    fn login_collapses_unknown_user_and_wrong_password() {
        let service = make_service();
        let req = register_request();
        let password = req.password.clone();
        let registered = service.register(req.clone()).expect("register");

        let unknown = service.login(
            &LoginRequest {
                email: format!("ghost_{}@example.com", Uuid::new_v4()),
                password: password.clone(),
            },
            test_ip(),
            None,
        );
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));

        let wrong = service.login(
            &LoginRequest {
                email: req.email.clone(),
                password: "WrongPassword123!".to_string(),
            },
            test_ip(),
            None,
        );
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        let ok = service
            .login(
                &LoginRequest {
                    email: req.email,
                    password,
                },
                test_ip(),
                Some("tests".to_string()),
            )
            .expect("correct login");
        assert_eq!(ok.user.id, registered.user.id);

        let _ = UserRepository::hard_delete(registered.user.id);
    }

    #[test]
    fn five_failures_lock_the_account() {
        let service = make_service();
        let req = register_request();
        let registered = service.register(req.clone()).expect("register");

        let wrong = LoginRequest {
            email: req.email.clone(),
            password: "WrongPassword123!".to_string(),
        };
        for _ in 0..5 {
            let result = service.login(&wrong, test_ip(), None);
            assert!(matches!(result, Err(AppError::InvalidCredentials)));
        }

        // Sixth attempt, even with the right password, hits the lock.
        let right = LoginRequest {
            email: req.email,
            password: req.password,
        };
        assert!(matches!(
            service.login(&right, test_ip(), None),
            Err(AppError::AccountLocked)
        ));

        let _ = UserRepository::hard_delete(registered.user.id);
    }

    #[test]
    fn refresh_rotation_is_at_most_once() {
        let service = make_service();
        let registered = service.register(register_request()).expect("register");

        let first = service
            .refresh_token(&RefreshTokenRequest {
                refresh_token: registered.refresh_token.clone(),
            })
            .expect("first rotation");
        assert_ne!(first.refresh_token, registered.refresh_token);

        // Replay of the consumed token.
        let replay = service.refresh_token(&RefreshTokenRequest {
            refresh_token: registered.refresh_token.clone(),
        });
        assert!(matches!(replay, Err(AppError::RefreshNotFound)));

        // The freshly rotated token works exactly once more.
        let second = service
            .refresh_token(&RefreshTokenRequest {
                refresh_token: first.refresh_token.clone(),
            })
            .expect("second rotation");
        assert_ne!(second.refresh_token, first.refresh_token);

        let _ = UserRepository::hard_delete(registered.user.id);
    }

    #[test]
    fn logout_blacklists_access_and_blocks_verify() {
        let service = make_service();
        let registered = service.register(register_request()).expect("register");

        let before = service.verify_token(&registered.access_token);
        assert!(before.valid);
        assert_eq!(before.user_id, Some(registered.user.id));

        service
            .logout(registered.user.id, &registered.access_token)
            .expect("logout");

        let after = service.verify_token(&registered.access_token);
        assert!(!after.valid);
        assert!(after.user_id.is_none());

        // Logout is idempotent.
        service
            .logout(registered.user.id, &registered.access_token)
            .expect("second logout");

        let _ = UserRepository::hard_delete(registered.user.id);
    }

    #[test]
    fn verify_is_opaque_on_garbage() {
        let service = make_service();
        let response = service.verify_token("definitely.not.a.token");
        assert!(!response.valid);
        assert!(response.email.is_none());
    }

    #[test]
    fn password_reset_token_is_single_use() {
        let service = make_service();
        let req = register_request();
        let registered = service.register(req.clone()).expect("register");

        let token = service
            .forgot_password(&req.email)
            .expect("forgot")
            .expect("token minted for existing user");

        service
            .reset_password(&token, "NewPassword456!")
            .expect("reset");

        // Second use must die.
        assert!(service.reset_password(&token, "AnotherPass789!").is_err());

        // Old password is gone, new one works.
        let old = service.login(
            &LoginRequest {
                email: req.email.clone(),
                password: req.password,
            },
            test_ip(),
            None,
        );
        assert!(old.is_err());

        let new = service.login(
            &LoginRequest {
                email: req.email,
                password: "NewPassword456!".to_string(),
            },
            test_ip(),
            None,
        );
        assert!(new.is_ok());

        let _ = UserRepository::hard_delete(registered.user.id);
    }

    #[test]
    fn forgot_password_is_silent_for_unknown_email() {
        let service = make_service();
        let result = service
            .forgot_password(&format!("ghost_{}@example.com", Uuid::new_v4()))
            .expect("forgot never errors for unknown emails");
        assert!(result.is_none());
    }

    #[test]
    fn deleted_account_fails_verify() {
        let service = make_service();
        let registered = service.register(register_request()).expect("register");

        service
            .delete_account(registered.user.id)
            .expect("delete account");

        let verify = service.verify_token(&registered.access_token);
        assert!(!verify.valid);

        let _ = UserRepository::hard_delete(registered.user.id);
    }

    #[test]
    fn preferences_upsert_via_update() {
        let service = make_service();
        let registered = service.register(register_request()).expect("register");

        // No stored preferences yet: update creates them.
        let updated = service
            .update_preferences(
                registered.user.id,
                UpdatePreferencesRequest {
                    theme: Some("dark".to_string()),
                    ..Default::default()
                },
            )
            .expect("upsert");
        assert_eq!(updated.theme, "dark");
        assert_eq!(updated.privacy_level, "normal");

        // Unknown labels are rejected before touching storage.
        let bad = service.update_preferences(
            registered.user.id,
            UpdatePreferencesRequest {
                theme: Some("solarized".to_string()),
                ..Default::default()
            },
        );
        assert!(bad.is_err());

        let _ = UserRepository::hard_delete(registered.user.id);
    }
}
