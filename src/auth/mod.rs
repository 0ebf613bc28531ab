pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::{Role, User, UserId};

pub use password::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    TokenInvalid(String),

    #[error("Expected a {expected} token")]
    WrongTokenKind { expected: TokenKind },

    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("User account is disabled")]
    InactiveUser,

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    Crypto(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second differ
    pub jti: Uuid,
}

impl Claims {
    fn new(user: &User, kind: TokenKind, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

/// Access and refresh token issued on login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn issue_access_token(user: &User, security: &SecurityConfig) -> Result<String, AuthError> {
    let ttl = Duration::minutes(security.access_token_minutes);
    sign(&Claims::new(user, TokenKind::Access, ttl), security)
}

pub fn issue_refresh_token(user: &User, security: &SecurityConfig) -> Result<String, AuthError> {
    let ttl = Duration::hours(security.refresh_token_hours);
    sign(&Claims::new(user, TokenKind::Refresh, ttl), security)
}

pub fn issue_token_pair(user: &User, security: &SecurityConfig) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access: issue_access_token(user, security)?,
        refresh: issue_refresh_token(user, security)?,
    })
}

fn sign(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Validates signature and expiry, then checks the token kind.
pub fn decode_token(token: &str, expected: TokenKind, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.jwt_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let claims = decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })?;

    if claims.kind != expected {
        return Err(AuthError::WrongTokenKind { expected });
    }
    Ok(claims)
}
