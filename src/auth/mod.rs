use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

/// Role allowed through the management routes.
pub const ADMIN_ROLE: &str = "admin";

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: String, email: String, role: String) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub,
            email,
            role,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    encode_jwt(claims, &config::config().security.jwt_secret)
}

pub fn decode_jwt(token: &str) -> Result<Claims, JwtError> {
    decode_jwt_with(token, &config::config().security.jwt_secret)
}

fn encode_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn decode_jwt_with(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

/// Salted bcrypt hash for the users table.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// Hashes that are not bcrypt never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}
