//! Bearer-token extractors.
//!
//! Handlers take [`AuthContext`] or [`RefreshContext`] as an argument and
//! get token parsing and verification for free; a missing or bad token is
//! rejected before the handler body runs.

use crate::error::ApiError;
use crate::server::LexilogServer;
use async_trait::async_trait;
use auth_session::{AccessTokenClaims, RefreshTokenClaims, User};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verified access-token claims for the calling user.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: AccessTokenClaims,
}

impl AuthContext {
    pub fn user(&self) -> &User {
        &self.claims.user
    }

    pub fn is_admin(&self) -> bool {
        self.claims.user.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if !self.is_admin() {
            return Err(ApiError::forbidden("admin access required"));
        }
        Ok(())
    }

    /// Owner-or-admin check against a resource owned by `owner_id`.
    pub fn require_owner_or_admin(&self, owner_id: i64) -> Result<(), ApiError> {
        if self.claims.user.id != owner_id && !self.is_admin() {
            return Err(ApiError::forbidden("not allowed to access this resource"));
        }
        Ok(())
    }
}

#[async_trait]
impl FromRequestParts<LexilogServer> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &LexilogServer,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let claims = state
            .issuer
            .decode_access(token)
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(Self { claims })
    }
}

/// Verified refresh-token claims plus the presented plaintext, which the
/// service layer still checks against the persisted hash.
#[derive(Debug, Clone)]
pub struct RefreshContext {
    pub claims: RefreshTokenClaims,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<LexilogServer> for RefreshContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &LexilogServer,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let claims = state
            .issuer
            .decode_refresh(token)
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(Self {
            claims,
            token: token.to_string(),
        })
    }
}
