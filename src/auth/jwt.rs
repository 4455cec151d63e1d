use crate::db::models::user::{User, UserRole};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token generation failed: {0}")]
    GenerationFailed(jsonwebtoken::errors::Error),
    #[error("Token verification failed: {0}")]
    VerificationFailed(jsonwebtoken::errors::Error),
    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType {
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Signed claim bundle shared by access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iss: String,
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// Issues and verifies claim bundles. Access and refresh tokens are signed
/// with *separate* HMAC-SHA-256 secrets, so a bundle can never be replayed
/// across the two roles regardless of its `type` claim.
#[derive(Clone)]
pub struct TokenSigner {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    issuer: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        issuer: impl Into<String>,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_ref()),
            access_decoding: DecodingKey::from_secret(access_secret.as_ref()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_ref()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_ref()),
            issuer: issuer.into(),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    /// Issues the access + refresh pair for a user.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, JwtError> {
        let access_token = self.issue(user, TokenKind::Access)?;
        let refresh_token = self.issue(user, TokenKind::Refresh)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer",
            expires_in: self.access_ttl_secs,
        })
    }

    pub fn issue(&self, user: &User, kind: TokenKind) -> Result<String, JwtError> {
        let now = Utc::now();
        let (key, ttl) = match kind {
            TokenKind::Access => (&self.access_encoding, self.access_ttl_secs),
            TokenKind::Refresh => (&self.refresh_encoding, self.refresh_ttl_secs),
        };

        let claims = Claims {
            user_id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            kind,
            iss: self.issuer.clone(),
            sub: user.id,
            iat: now.timestamp(),
            exp: now.timestamp() + ttl,
        };

        encode(&Header::new(Algorithm::HS256), &claims, key).map_err(JwtError::GenerationFailed)
    }

    /// Verifies an access bundle: algorithm and signature first, then
    /// expiry, then the `type` claim.
    pub fn verify_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify(token, &self.access_decoding, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify(token, &self.refresh_decoding, TokenKind::Refresh)
    }

    fn verify(
        &self,
        token: &str,
        key: &DecodingKey,
        expected: TokenKind,
    ) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(JwtError::VerificationFailed)?;

        if claims.kind != expected {
            return Err(JwtError::WrongTokenType {
                expected: expected.as_str(),
                actual: claims.kind.as_str(),
            });
        }

        Ok(claims)
    }

    /// Stable 64-hex SHA-256 fingerprint of a token. Used as the index key
    /// in both stores; never reversible.
    pub fn hash_token(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        hex::encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_signer() -> TokenSigner {
        TokenSigner::new("access_secret_for_tests", "refresh_secret_for_tests", "authd", 900, 3600)
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "signer@example.com".to_string(),
            username: "signer".to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::User,
            is_active: true,
            email_verified: false,
            google_id: None,
            github_id: None,
            facebook_id: None,
            first_name: None,
            last_name: None,
            phone_number: None,
            bio: None,
            avatar_url: None,
            date_of_birth: None,
            gender: None,
            country: None,
            city: None,
            timezone: None,
            language: "en".to_string(),
            website: None,
            linkedin: None,
            twitter: None,
            github: None,
            last_login_at: None,
            last_login_ip: None,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn pair_round_trips_with_matching_claims() {
        let signer = make_signer();
        let user = test_user();

        let pair = signer.issue_pair(&user).expect("issue pair");
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 900);

        let access = signer.verify_access(&pair.access_token).expect("verify access");
        assert_eq!(access.user_id, user.id);
        assert_eq!(access.sub, user.id);
        assert_eq!(access.email, user.email);
        assert_eq!(access.role, UserRole::User);
        assert_eq!(access.iss, "authd");

        let refresh = signer.verify_refresh(&pair.refresh_token).expect("verify refresh");
        assert_eq!(refresh.user_id, user.id);
        assert!(refresh.exp > access.exp, "refresh must outlive access");
    }

    #[test]
    fn cross_secret_verification_fails() {
        let signer = make_signer();
        let user = test_user();
        let pair = signer.issue_pair(&user).expect("issue pair");

        // An access token presented as a refresh token is signed with the
        // wrong secret and must die on the signature check.
        assert!(matches!(
            signer.verify_refresh(&pair.access_token),
            Err(JwtError::VerificationFailed(_))
        ));
        assert!(matches!(
            signer.verify_access(&pair.refresh_token),
            Err(JwtError::VerificationFailed(_))
        ));
    }

    #[test]
    fn type_claim_is_checked_when_secrets_are_shared() {
        // Same secret on both sides isolates the `type` gate.
        let signer = TokenSigner::new("shared", "shared", "authd", 900, 3600);
        let user = test_user();
        let pair = signer.issue_pair(&user).expect("issue pair");

        assert!(matches!(
            signer.verify_access(&pair.refresh_token),
            Err(JwtError::WrongTokenType { expected: "access", actual: "refresh" })
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new("a", "r", "authd", -10, -10);
        let user = test_user();
        let pair = signer.issue_pair(&user).expect("issue pair");

        assert!(matches!(
            signer.verify_access(&pair.access_token),
            Err(JwtError::VerificationFailed(_))
        ));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let signer = make_signer();
        assert!(signer.verify_access("not.a.token").is_err());
        assert!(signer.verify_access("").is_err());
    }

    #[test]
    fn hash_is_deterministic_64_hex() {
        let h1 = TokenSigner::hash_token("some-token");
        let h2 = TokenSigner::hash_token("some-token");
        let h3 = TokenSigner::hash_token("other-token");

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
