//! Password hashing with Argon2 and strength checks

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

use crm_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Password too short")]
    TooShort,
    #[error("Password too long")]
    TooLong,
    #[error("Password too weak (score {0}/4)")]
    TooWeak(u8),
}

/// Minimum zxcvbn score accepted for new passwords.
const MIN_STRENGTH_SCORE: u8 = 2;

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Checks length bounds and zxcvbn strength; `user_inputs` are words such as the
    /// username or email that must not make the password guessable.
    pub fn check_strength(password: &str, user_inputs: &[&str]) -> Result<(), PasswordError> {
        let len = password.chars().count();
        if len < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort);
        }
        if len > MAX_PASSWORD_LENGTH {
            return Err(PasswordError::TooLong);
        }
        let score = zxcvbn::zxcvbn(password, user_inputs).score() as u8;
        if score < MIN_STRENGTH_SCORE {
            return Err(PasswordError::TooWeak(score));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash("Orchid-Delivery-2024!").unwrap();
        assert!(PasswordService::verify("Orchid-Delivery-2024!", &hash).unwrap());
        assert!(!PasswordService::verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_strength_rejects_short() {
        assert_eq!(PasswordService::check_strength("abc", &[]), Err(PasswordError::TooShort));
    }

    #[test]
    fn test_strength_rejects_common_password() {
        assert!(matches!(
            PasswordService::check_strength("password", &[]),
            Err(PasswordError::TooWeak(_))
        ));
    }

    #[test]
    fn test_strength_accepts_passphrase() {
        assert!(PasswordService::check_strength("tulip canyon harbor violet", &[]).is_ok());
    }
}
