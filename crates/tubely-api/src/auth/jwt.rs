//! HS256 access tokens.
//!
//! Tokens carry the user id as `sub` and are issued by `tubely-access`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;
use tubely_core::constants::ACCESS_TOKEN_ISSUER;
use tubely_core::AppError;
use uuid::Uuid;

use crate::auth::models::JwtClaims;

/// Sign an access token for `user_id` valid for `expires_in`.
pub fn issue_access_token(
    user_id: Uuid,
    secret: &str,
    expires_in: Duration,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let ttl = i64::try_from(expires_in.as_secs())
        .map_err(|_| AppError::Internal("Token lifetime out of range".to_string()))?;

    let claims = JwtClaims {
        iss: ACCESS_TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Validate a bearer token and return the user id it was issued for.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
    validation.leeway = 0;

    let token_data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {}", e);
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Unauthorized("Token has expired".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                AppError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => AppError::Unauthorized("Couldn't validate JWT".to_string()),
        }
    })?;

    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))
}
