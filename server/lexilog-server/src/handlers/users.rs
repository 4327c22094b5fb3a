//! User handlers. Listing is admin-only; reads and updates are
//! owner-or-admin, and role changes are admin-only.

use crate::error::{api_ok, api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::LexilogServer;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};
use auth_session::{is_valid_email, Preferences, Role, User};
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

pub async fn list_users(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    ctx.require_admin()?;

    let users = server.users.list().await?;
    let users = users.into_iter().map(|u| u.snapshot()).collect();

    Ok(Json(api_success(users)))
}

pub async fn get_user(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    ctx.require_owner_or_admin(id)?;

    let user = server
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(api_success(user.snapshot())))
}

/// Partial update: omitted fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub preferences: Option<Preferences>,
}

impl RequestValidation for UpdateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(email) = &self.email {
            validate_field!(email, is_valid_email(email), "invalid `email` supplied");
        }
        if let Some(display_name) = &self.display_name {
            validate_required!(display_name, "`display_name` must not be blank");
        }
        Ok(())
    }
}

pub async fn update_user(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    ctx.require_owner_or_admin(id)?;
    request.validate()?;

    let mut user = server
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    if let Some(email) = request.email {
        if email != user.email {
            if server.users.find_by_email(&email).await?.is_some() {
                return Err(ApiError::validation("`email` is already in use"));
            }
            user.email = email;
        }
    }
    if let Some(display_name) = request.display_name {
        user.display_name = display_name;
    }
    if let Some(role) = request.role {
        // Only admins assign roles; a user can never escalate or clear
        // their own.
        if role != user.role && !ctx.is_admin() {
            return Err(ApiError::forbidden("not allowed to change role"));
        }
        user.role = role;
    }
    if let Some(preferences) = request.preferences {
        user.preferences = preferences;
    }

    server.users.update(&user).await?;

    Ok(Json(api_ok()))
}
