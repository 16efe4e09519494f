//! JWT token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crm_shared::constants::TOKEN_TYPE_ACCESS;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Unexpected token type: {0}")]
    WrongTokenType(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|e| JwtError::ValidationError(e.to_string()))
    }
}

/// Issues and checks access tokens. Role is deliberately not embedded: it is
/// re-read from the profile on every request so role changes apply immediately.
#[derive(Clone)]
pub struct JwtService {
    secret: String,
    access_token_expiry: i64,
}

impl JwtService {
    pub fn new(secret: String, access_expiry: i64) -> Self {
        Self {
            secret,
            access_token_expiry: access_expiry,
        }
    }

    pub fn access_token_expiry(&self) -> i64 {
        self.access_token_expiry
    }

    pub fn generate_access_token(&self, user_id: &Uuid) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            token_type: TOKEN_TYPE_ACCESS.to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| JwtError::ValidationError(e.to_string()))?;

        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(JwtError::WrongTokenType(claims.token_type));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_access_token() {
        let service = JwtService::new("test-secret".to_string(), 3600);
        let user_id = Uuid::new_v4();
        let token = service.generate_access_token(&user_id).unwrap();
        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn test_rejects_foreign_secret() {
        let issuer = JwtService::new("secret-a".to_string(), 3600);
        let verifier = JwtService::new("secret-b".to_string(), 3600);
        let token = issuer.generate_access_token(&Uuid::new_v4()).unwrap();
        assert!(verifier.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let service = JwtService::new("test-secret".to_string(), -3600);
        let token = service.generate_access_token(&Uuid::new_v4()).unwrap();
        assert!(service.validate_access_token(&token).is_err());
    }
}
