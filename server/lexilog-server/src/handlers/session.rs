//! Session handlers: register, login, refresh, and re-authenticate.

use crate::error::{api_ok, ApiError, ApiResponse};
use crate::middleware::{AuthContext, RefreshContext};
use crate::server::LexilogServer;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use auth_session::{LoginRequest, Registration, SessionTokens};
use serde::Deserialize;

impl RequestValidation for Registration {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "`email` is required");
        validate_required!(self.display_name, "`display_name` is required");
        validate_field!(
            self.password,
            !self.password.is_empty(),
            "`password` is required"
        );
        Ok(())
    }
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "`email` is required");
        validate_field!(
            self.password,
            !self.password.is_empty(),
            "`password` is required"
        );
        validate_required!(self.device_id, "`device_id` is required");
        Ok(())
    }
}

pub async fn register(
    State(server): State<LexilogServer>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<ApiResponse<()>>), ApiError> {
    registration.validate()?;

    server.sessions.register(registration).await?;

    Ok((StatusCode::CREATED, Json(api_ok())))
}

pub async fn login(
    State(server): State<LexilogServer>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionTokens>, ApiError> {
    request.validate()?;

    let tokens = server.sessions.login(&request).await?;

    Ok(Json(tokens))
}

/// Re-issue an access token for a caller whose current one is still valid.
/// The refresh lineage is left untouched.
pub async fn refresh(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
) -> Result<Json<SessionTokens>, ApiError> {
    let tokens = server.sessions.refresh_access(&ctx.claims).await?;

    Ok(Json(tokens))
}

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub device_id: String,
}

/// Exchange a refresh token for a new token pair. The bearer token here is
/// the refresh token, and the device in the body must match the one the
/// token was minted for.
pub async fn authenticate(
    State(server): State<LexilogServer>,
    ctx: RefreshContext,
    Json(request): Json<AuthenticateRequest>,
) -> Result<Json<SessionTokens>, ApiError> {
    if request.device_id != ctx.claims.device_id {
        return Err(ApiError::Unauthorized);
    }

    let tokens = server.sessions.reauthenticate(&ctx.claims, &ctx.token).await?;

    Ok(Json(tokens))
}
