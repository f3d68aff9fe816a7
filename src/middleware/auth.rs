use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use axum_extra::TypedHeader;
use headers::Authorization;
use headers::authorization::Bearer;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::Config;
use crate::error::HomeMatchError;
use crate::router::HomeMatchState;

/// Claims we rely on from the identity provider's access token.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

/// Verify an HS256 access token against the configured secret and audience.
pub fn verify_token(cfg: &Config, key: &DecodingKey, token: &str) -> Result<Claims, HomeMatchError> {
    if cfg.jwt_secret.is_empty() {
        return Err(HomeMatchError::Unauthorized("token verification is not configured"));
    }
    let mut validation = Validation::new(Algorithm::HS256);
    match &cfg.jwt_audience {
        Some(aud) => validation.set_audience(&[aud]),
        None => validation.validate_aud = false,
    }
    let data = decode::<Claims>(token, key, &validation)?;
    if data.claims.sub.trim().is_empty() {
        return Err(HomeMatchError::Unauthorized("token has no subject"));
    }
    Ok(data.claims)
}

/// The authenticated caller. Extracting it guarantees a profile row exists.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

impl FromRequestParts<HomeMatchState> for AuthUser {
    type Rejection = HomeMatchError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HomeMatchState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| HomeMatchError::Unauthorized("missing bearer token"))?;

        let claims = verify_token(&state.config, &state.jwt_key, bearer.token()).inspect_err(
            |e| debug!(error = %e, "rejected access token"),
        )?;

        state
            .storage
            .ensure_profile(&claims.sub, claims.email.as_deref())
            .await?;

        Ok(Self {
            id: claims.sub,
            email: claims.email,
        })
    }
}

/// Ensure the inbound request carries the service key.
/// Accepts either:
/// - Header: `x-api-key: ...`
/// - Header: `Authorization: Bearer ...`
pub fn ensure_service_key(headers: &HeaderMap, expected: &str) -> Result<(), HomeMatchError> {
    if expected.is_empty() {
        return Err(HomeMatchError::Unauthorized("service key is not configured"));
    }
    let matches = |candidate: &str| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()));

    if let Some(hv) = headers.get("x-api-key").and_then(|v| v.to_str().ok())
        && matches(hv.trim())
    {
        return Ok(());
    }

    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && matches(token)
        {
            return Ok(());
        }
    }

    Err(HomeMatchError::Unauthorized("invalid or missing service key"))
}

#[derive(Debug, Clone, Copy)]
pub struct RequireServiceKey;

impl FromRequestParts<HomeMatchState> for RequireServiceKey {
    type Rejection = HomeMatchError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HomeMatchState,
    ) -> Result<Self, Self::Rejection> {
        ensure_service_key(&parts.headers, &state.config.service_key)?;
        Ok(Self)
    }
}
