//! Postgres repository implementations.
//!
//! The user and refresh-token repositories implement the storage traits
//! defined in `auth-session`; the log repository trait lives here because
//! study logs are a server concern.

use crate::models::{Log, LogFilter, NewLog};
use async_trait::async_trait;

mod log_repository;
mod refresh_token_repository;
mod user_repository;

pub use log_repository::{InMemoryLogRepository, PostgresLogRepository};
pub use refresh_token_repository::PostgresRefreshTokenRepository;
pub use user_repository::PostgresUserRepository;

pub type DbResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn create(&self, log: NewLog) -> DbResult<Log>;

    /// Find a non-deleted log by id.
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Log>>;

    /// Non-deleted logs matching the filter, newest first, one page at a
    /// time.
    async fn list(&self, filter: &LogFilter) -> DbResult<Vec<Log>>;

    /// Replace the mutable fields of a non-deleted log. Returns `false` when
    /// no row matches.
    async fn update(&self, log: &Log) -> DbResult<bool>;

    /// Soft-delete. Returns `false` when no live row matches.
    async fn delete(&self, id: i64) -> DbResult<bool>;
}
