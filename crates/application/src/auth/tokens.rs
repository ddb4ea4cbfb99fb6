use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::dtos::Claims;
use crate::{AppError, AppResult};

/// Mint a bearer token for a user. This is the credential service's
/// `issueToken` side of the contract; the messaging core itself only ever
/// verifies, but expressing both halves here keeps the interface in one
/// place and lets tests mint tokens.
pub fn issue_token(secret: &str, user_id: Uuid, email: &str, ttl_seconds: i64) -> AppResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: now + ttl_seconds,
        iat: now,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Validate a bearer token against the process-wide signing secret and
/// return its claims. Expired, malformed and badly-signed tokens all map
/// to `AppError::Authentication` with a distinct reason.
pub fn verify_token(secret: &str, token: &str) -> AppResult<Claims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(token_data.claims)
}

/// Parse the stable user identifier out of verified claims.
pub fn claims_user_id(claims: &Claims) -> AppResult<Uuid> {
    Uuid::parse_str(&claims.sub).map_err(AppError::from)
}
