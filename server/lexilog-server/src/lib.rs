//! HTTP API server for the lexilog study-log service.
//!
//! Wires the session and log services from `auth-session` and the Postgres
//! repositories into an axum application.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod validation;

pub use config::ServerConfig;
pub use server::LexilogServer;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Embedded migrations, applied at startup and by the `migrate` subcommand.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

pub fn create_app(server: LexilogServer) -> Router {
    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer()),
        )
        .with_state(server)
}
