//! Route table, one function per resource.

use crate::handlers::{health, logs, session, users};
use crate::server::LexilogServer;
use axum::routing::{get, post};
use axum::Router;

pub fn create_routes() -> Router<LexilogServer> {
    Router::new()
        .merge(health_routes())
        .merge(session_routes())
        .merge(user_routes())
        .merge(log_routes())
}

fn health_routes() -> Router<LexilogServer> {
    Router::new().route("/health", get(health::health_check))
}

fn session_routes() -> Router<LexilogServer> {
    Router::new()
        .route("/api/register", post(session::register))
        .route("/api/login", post(session::login))
        .route("/api/session/refresh", post(session::refresh))
        .route("/api/session/authenticate", post(session::authenticate))
}

fn user_routes() -> Router<LexilogServer> {
    Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id", get(users::get_user).put(users::update_user))
}

fn log_routes() -> Router<LexilogServer> {
    Router::new()
        .route("/api/logs", get(logs::list_logs).post(logs::create_log))
        .route(
            "/api/logs/:id",
            get(logs::get_log)
                .put(logs::update_log)
                .delete(logs::delete_log),
        )
}
