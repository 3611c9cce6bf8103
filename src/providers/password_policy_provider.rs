/// Minimum password length accepted at registration and password change
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Upper bound keeping Argon2 input sizes sane
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password policy provider
///
/// Length rules only, counted in characters rather than bytes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPolicyProvider {
    min_length: usize,
    max_length: usize,
}

impl PasswordPolicyProvider {
    pub fn new() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            max_length: MAX_PASSWORD_LENGTH,
        }
    }

    /// Validate a candidate password
    ///
    /// # Errors
    /// * `PasswordPolicyError::TooShort` - Fewer than 8 characters
    /// * `PasswordPolicyError::TooLong` - More than 128 characters
    pub fn validate(&self, password: &str) -> Result<(), PasswordPolicyError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordPolicyError::TooShort(self.min_length));
        }
        if length > self.max_length {
            return Err(PasswordPolicyError::TooLong(self.max_length));
        }
        Ok(())
    }
}

impl Default for PasswordPolicyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Password must not exceed {0} characters")]
    TooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_too_short() {
        let policy = PasswordPolicyProvider::new();
        assert_eq!(policy.validate("short"), Err(PasswordPolicyError::TooShort(8)));
        assert_eq!(policy.validate(""), Err(PasswordPolicyError::TooShort(8)));
    }

    #[test]
    fn test_password_at_minimum_length_accepted() {
        let policy = PasswordPolicyProvider::new();
        assert!(policy.validate("abcdefgh").is_ok());
    }

    #[test]
    fn test_password_too_long() {
        let policy = PasswordPolicyProvider::new();
        let long_password = "a".repeat(129);
        assert_eq!(policy.validate(&long_password), Err(PasswordPolicyError::TooLong(128)));
        assert!(policy.validate(&"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let policy = PasswordPolicyProvider::new();
        // 7 characters, 14 bytes
        assert!(policy.validate("ééééééé").is_err());
    }
}
