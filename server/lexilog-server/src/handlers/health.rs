use crate::server::LexilogServer;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
}

pub async fn health_check(State(server): State<LexilogServer>) -> Json<HealthStatus> {
    let database = server.database_is_healthy().await;

    Json(HealthStatus {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}
