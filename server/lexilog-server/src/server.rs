//! Shared server state: configuration, token issuer, services, and
//! repositories behind trait objects so tests can swap in the in-memory
//! implementations.

use crate::config::ServerConfig;
use crate::db::{
    LogRepository, PostgresLogRepository, PostgresRefreshTokenRepository, PostgresUserRepository,
};
use auth_session::{
    RefreshTokenRepository, RefreshTokenService, SessionService, TokenIssuer, UserRepository,
};
use database_layer::DatabasePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct LexilogServer {
    pub config: ServerConfig,
    pub issuer: Arc<TokenIssuer>,
    pub sessions: Arc<SessionService>,
    pub users: Arc<dyn UserRepository>,
    pub logs: Arc<dyn LogRepository>,
    db: Option<DatabasePool>,
}

impl LexilogServer {
    /// Connect to Postgres, apply migrations, and wire up the services.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let db = DatabasePool::new(&config.database_url).await?;
        db.run_migrations(&crate::MIGRATOR).await?;

        let users = Arc::new(PostgresUserRepository::new(db.pool().clone()));
        let refresh_tokens = Arc::new(PostgresRefreshTokenRepository::new(db.pool().clone()));
        let logs = Arc::new(PostgresLogRepository::new(db.pool().clone()));

        Ok(Self::with_repositories(
            config,
            users,
            refresh_tokens,
            logs,
            Some(db),
        ))
    }

    /// Wire up the services over caller-supplied repositories. Tests use
    /// this with the in-memory implementations.
    pub fn with_repositories(
        config: ServerConfig,
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        logs: Arc<dyn LogRepository>,
        db: Option<DatabasePool>,
    ) -> Self {
        let issuer = Arc::new(TokenIssuer::new(config.token_config()));
        let refresh = RefreshTokenService::new(issuer.clone(), refresh_tokens);
        let sessions = Arc::new(SessionService::new(users.clone(), refresh, issuer.clone()));

        Self {
            config,
            issuer,
            sessions,
            users,
            logs,
            db,
        }
    }

    /// Database health, `true` when running without a database.
    pub async fn database_is_healthy(&self) -> bool {
        match &self.db {
            Some(db) => db.is_healthy().await,
            None => true,
        }
    }
}
