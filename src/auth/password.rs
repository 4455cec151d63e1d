use bcrypt::{DEFAULT_COST, hash, verify};

pub struct PasswordManager;

impl PasswordManager {
    pub fn hash(password: &str) -> Result<String, String> {
        hash(password, DEFAULT_COST).map_err(|e| format!("Password hashing failed: {}", e))
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, String> {
        verify(password, hash).map_err(|e| format!("Password verification failed: {}", e))
    }

    /// Policy check: configurable minimum length, plus at least one
    /// uppercase letter, one lowercase letter and one digit.
    pub fn is_strong(password: &str, min_len: usize) -> bool {
        if password.len() < min_len {
            return false;
        }
        let (mut upper, mut lower, mut digit) = (false, false, false);
        for c in password.chars() {
            upper |= c.is_uppercase();
            lower |= c.is_lowercase();
            digit |= c.is_ascii_digit();
            if upper && lower && digit {
                return true;
            }
        }
        upper && lower && digit
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordManager;

    #[test]
    fn hash_and_verify_succeeds_with_correct_password() {
        let password = "secure_password_@123P";
        let hashed = PasswordManager::hash(password).expect("Hashing failed");

        assert!(PasswordManager::verify(password, &hashed).expect("Verification failed"));
        assert!(
            !PasswordManager::verify("wrong_password_@123", &hashed).expect("Verification failed")
        );
    }

    #[test]
    fn hash_produces_unique_hashes_for_same_password() {
        let hash1 = PasswordManager::hash("same_password1A").unwrap();
        let hash2 = PasswordManager::hash("same_password1A").unwrap();

        // bcrypt salts per call
        assert_ne!(hash1, hash2);
        assert!(PasswordManager::verify("same_password1A", &hash1).unwrap());
        assert!(PasswordManager::verify("same_password1A", &hash2).unwrap());
    }

    #[test]
    fn strength_policy_requires_mixed_classes_and_length() {
        assert!(PasswordManager::is_strong("Abcdef12", 8));
        assert!(!PasswordManager::is_strong("Abcde12", 8)); // too short
        assert!(!PasswordManager::is_strong("abcdefg1", 8)); // no uppercase
        assert!(!PasswordManager::is_strong("ABCDEFG1", 8)); // no lowercase
        assert!(!PasswordManager::is_strong("Abcdefgh", 8)); // no digit
        assert!(!PasswordManager::is_strong("Abcdef12", 12)); // below configured minimum
    }

    #[test]
    fn verify_fails_when_case_differs() {
        let hash = PasswordManager::hash("MyPassword").unwrap();

        let result = PasswordManager::verify("mypassword", &hash);

        assert!(result.is_ok());
        assert!(!result.unwrap()); // Should be false, not error
    }
}
