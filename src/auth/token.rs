//! HS256 bearer tokens for the admin console.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims embedded in every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: u64,
    pub roles: Vec<String>,
    pub exp: i64,
    pub iat: i64,
    /// Session id; must match the user's active session to be accepted
    pub jti: String,
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue_token(
    user_id: u64,
    roles: &[String],
    secret: &str,
    ttl_hours: i64,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(ttl_hours);
    let jti = uuid::Uuid::new_v4().to_string();

    let claims = Claims {
        sub: user_id,
        roles: roles.to_vec(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        jti: jti.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(IssuedToken {
        token,
        jti,
        expires_at,
    })
}

/// Check the signature and expiry of a token and return its claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
