use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub mod password;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("Token error: {0}")]
    Token(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - account id
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(account_id: Uuid, email: String, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(security.jwt_expiry_hours as i64)).timestamp();

        Self {
            sub: account_id,
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

pub fn generate_jwt(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::Token(e.to_string()))
}

pub fn validate_jwt(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::Token(format!("Invalid JWT token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            enable_cors: false,
            cors_origins: vec![],
        }
    }

    #[test]
    fn jwt_round_trip() {
        let security = test_security();
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "a@b.test".to_string(), &security);
        let token = generate_jwt(&claims, &security).unwrap();

        let decoded = validate_jwt(&token, &security).unwrap();
        assert_eq!(decoded.sub, id);
        assert_eq!(decoded.email, "a@b.test");
    }

    #[test]
    fn rejects_wrong_secret() {
        let security = test_security();
        let claims = Claims::new(Uuid::new_v4(), "a@b.test".to_string(), &security);
        let token = generate_jwt(&claims, &security).unwrap();

        let mut other = test_security();
        other.jwt_secret = "other-secret".to_string();
        assert!(validate_jwt(&token, &other).is_err());
    }

    #[test]
    fn rejects_empty_secret() {
        let mut security = test_security();
        security.jwt_secret = String::new();
        let claims = Claims::new(Uuid::new_v4(), "a@b.test".to_string(), &test_security());
        assert!(matches!(
            generate_jwt(&claims, &security),
            Err(AuthError::MissingSecret)
        ));
    }
}
