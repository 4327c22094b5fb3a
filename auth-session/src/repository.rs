//! Storage traits for the session subsystem.
//!
//! The server crate implements these over Postgres; [`crate::memory`]
//! provides in-memory implementations for tests and development.

use crate::error::Result;
use crate::models::{NewUser, RefreshToken, User};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    /// Update email, display name, role, and preferences by `user.id`.
    /// Fails with `UserNotFound` when no row matches.
    async fn update(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Atomically invalidate every active row for `(user_id, device_id)` and
    /// insert a new active row holding `token_hash`. Either both steps apply
    /// or neither does; a failure must leave the previously active row
    /// untouched.
    async fn rotate(&self, user_id: i64, device_id: &str, token_hash: &str)
        -> Result<RefreshToken>;

    /// The single active row for the pair, if any.
    async fn find_active(&self, user_id: i64, device_id: &str) -> Result<Option<RefreshToken>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshToken>>;
}
