// src/auth/jwt.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::AppError;
use crate::models::user::Role;

/// Token payload. Subject is the username; `uid` carries the database id so
/// handlers can scope queries without an extra lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: i64,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

pub fn sign_token(
    user_id: i64,
    username: &str,
    role: Role,
    config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::hours(config.expiration_hours);
    let claims = Claims {
        sub: username.to_string(),
        uid: user_id,
        role,
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|d| d.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::unauthorized("Token has expired"),
        _ => AppError::unauthorized("Invalid token"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(hours: i64) -> JwtConfig {
        JwtConfig {
            secret: "test-secret-at-least-32-bytes-long!".to_string(),
            expiration_hours: hours,
        }
    }

    #[test]
    fn sign_then_verify_preserves_identity() {
        let cfg = config(24);
        let token = sign_token(42, "alice", Role::User, &cfg).unwrap();
        let claims = verify_token(&token, &cfg.secret).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let cfg = config(-2);
        let token = sign_token(1, "bob", Role::User, &cfg).unwrap();
        match verify_token(&token, &cfg.secret) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("expected expired-token error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_secret_is_rejected_as_invalid() {
        let cfg = config(24);
        let token = sign_token(1, "bob", Role::Admin, &cfg).unwrap();
        match verify_token(&token, "a-completely-different-secret-value") {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("Invalid")),
            other => panic!("expected invalid-token error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert!(verify_token("not.a.jwt", "whatever-secret").is_err());
        assert!(verify_token("", "whatever-secret").is_err());
    }
}
