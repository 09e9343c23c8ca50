use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::routes::{ApiError, AppState};
use crate::session::SessionId;

/// JWT claims: `sub` = session id (Uuid as string), `exp` (expiry), `iat` (issued at).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Live session extracted from a JWT Bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthSession {
    pub session_id: SessionId,
}

impl Claims {
    pub fn new(session_id: SessionId, ttl_hours: i64) -> Self {
        let now = chrono::Utc::now();
        let exp = (now + chrono::Duration::hours(ttl_hours)).timestamp();
        Self {
            sub: session_id.to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

pub fn create_token(
    secret: &[u8],
    session_id: SessionId,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(session_id, ttl_hours);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

pub fn decode_token(secret: &[u8], token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(token_data.claims)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects with 401 unless the token is valid and its session is still open.
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::LoginRequired)?;
        let claims = decode_token(&state.jwt_secret, token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            ApiError::LoginRequired
        })?;
        let session_id = Uuid::parse_str(&claims.sub).map_err(|_| ApiError::LoginRequired)?;

        if !state.sessions.contains(session_id).await {
            return Err(ApiError::LoginRequired);
        }
        Ok(AuthSession { session_id })
    }
}
