//! Study-log handlers. Every route requires a valid access token; entries
//! belong to their creator and only the owner or an admin may touch them.

use crate::error::{api_ok, api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::models::{Activity, Log, LogFilter, NewLog};
use crate::server::LexilogServer;
use crate::validate_field;
use crate::validation::RequestValidation;
use auth_session::Language;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LogPayload {
    pub language: Language,
    pub date: NaiveDate,
    pub duration: i64,
    pub activity: Activity,
    #[serde(default)]
    pub notes: String,
}

impl RequestValidation for LogPayload {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!(
            self.duration,
            self.duration > 0,
            "`duration` must be positive"
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct LogQuery {
    pub user_id: Option<i64>,
    pub language: Option<Language>,
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub page: Option<u32>,
}

pub async fn create_log(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
    Json(payload): Json<LogPayload>,
) -> Result<(StatusCode, Json<ApiResponse<Log>>), ApiError> {
    payload.validate()?;

    // Ownership comes from the token, never from the payload.
    let log = server
        .logs
        .create(NewLog {
            user_id: ctx.user().id,
            language: payload.language,
            date: payload.date,
            duration: payload.duration,
            activity: payload.activity,
            notes: payload.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(api_success(log))))
}

pub async fn list_logs(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
    Query(query): Query<LogQuery>,
) -> Result<Json<ApiResponse<Vec<Log>>>, ApiError> {
    // Non-admins only ever see their own entries; admins may scope to any
    // user or see everything.
    let user_id = if ctx.is_admin() {
        query.user_id
    } else {
        Some(ctx.user().id)
    };

    let filter = LogFilter {
        user_id,
        language: query.language,
        date: query.date,
        from: query.from,
        until: query.until,
        page: query.page.unwrap_or(1),
    };

    let logs = server.logs.list(&filter).await?;

    Ok(Json(api_success(logs)))
}

pub async fn get_log(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Log>>, ApiError> {
    let log = server
        .logs
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("log not found"))?;

    ctx.require_owner_or_admin(log.user_id)?;

    Ok(Json(api_success(log)))
}

pub async fn update_log(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
    Path(id): Path<i64>,
    Json(payload): Json<LogPayload>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    payload.validate()?;

    let mut log = server
        .logs
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("log not found"))?;

    ctx.require_owner_or_admin(log.user_id)?;

    log.language = payload.language;
    log.date = payload.date;
    log.duration = payload.duration;
    log.activity = payload.activity;
    log.notes = payload.notes;

    if !server.logs.update(&log).await? {
        return Err(ApiError::not_found("log not found"));
    }

    Ok(Json(api_ok()))
}

pub async fn delete_log(
    State(server): State<LexilogServer>,
    ctx: AuthContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let log = server
        .logs
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("log not found"))?;

    ctx.require_owner_or_admin(log.user_id)?;

    if !server.logs.delete(log.id).await? {
        return Err(ApiError::not_found("log not found"));
    }

    Ok(Json(api_ok()))
}
