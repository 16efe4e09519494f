//! One-time tokens (password-set links)

use sha2::{Digest, Sha256};

/// A random token handed out once; only its digest is persisted.
#[derive(Debug, Clone)]
pub struct OneTimeToken {
    pub plain: String,
    pub digest: String,
}

impl OneTimeToken {
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::random();
        let plain = hex::encode(bytes);
        let digest = Self::digest_of(&plain);
        Self { plain, digest }
    }

    pub fn digest_of(plain: &str) -> String {
        hex::encode(Sha256::digest(plain.trim().as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = OneTimeToken::generate();
        let b = OneTimeToken::generate();
        assert_ne!(a.plain, b.plain);
        assert_eq!(a.plain.len(), 64);
    }

    #[test]
    fn test_digest_matches() {
        let token = OneTimeToken::generate();
        assert_eq!(OneTimeToken::digest_of(&token.plain), token.digest);
        assert_ne!(token.digest, token.plain);
    }
}
