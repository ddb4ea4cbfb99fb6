use serde::{Deserialize, Serialize};

// ============ JWT Claims ============

/// Claims embedded in every bearer token: the user id (`sub`), the email
/// claim, and the usual expiry/issued-at pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

// ============ Error payloads ============

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_code: String,
}
