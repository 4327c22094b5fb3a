//! In-memory repository implementations for tests and development.

use crate::error::{AuthError, Result};
use crate::models::{NewUser, RefreshToken, User};
use crate::repository::{RefreshTokenRepository, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.lock();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            email: user.email,
            display_name: user.display_name,
            password_hash: user.password_hash,
            role: user.role,
            preferences: user.preferences,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(self.users.lock().clone())
    }

    async fn update(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock();
        let existing = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(AuthError::UserNotFound)?;

        existing.email = user.email.clone();
        existing.display_name = user.display_name.clone();
        existing.role = user.role;
        existing.preferences = user.preferences.clone();
        Ok(())
    }
}

pub struct InMemoryRefreshTokenRepository {
    tokens: Mutex<Vec<RefreshToken>>,
    next_id: AtomicI64,
}

impl Default for InMemoryRefreshTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of active rows for a pair. Test helper for the rotation
    /// invariant.
    pub fn active_count(&self, user_id: i64, device_id: &str) -> usize {
        self.tokens
            .lock()
            .iter()
            .filter(|t| t.user_id == user_id && t.device_id == device_id && t.is_active())
            .count()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn rotate(
        &self,
        user_id: i64,
        device_id: &str,
        token_hash: &str,
    ) -> Result<RefreshToken> {
        // The single lock makes invalidate-then-insert atomic, mirroring the
        // Postgres transaction.
        let mut tokens = self.tokens.lock();
        let now = Utc::now();

        for token in tokens
            .iter_mut()
            .filter(|t| t.user_id == user_id && t.device_id == device_id && t.is_active())
        {
            token.invalidated_at = Some(now);
            token.updated_at = now;
        }

        let token = RefreshToken {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            device_id: device_id.to_string(),
            token_hash: token_hash.to_string(),
            created_at: now,
            updated_at: now,
            invalidated_at: None,
        };
        tokens.push(token.clone());
        Ok(token)
    }

    async fn find_active(&self, user_id: i64, device_id: &str) -> Result<Option<RefreshToken>> {
        Ok(self
            .tokens
            .lock()
            .iter()
            .find(|t| t.user_id == user_id && t.device_id == device_id && t.is_active())
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RefreshToken>> {
        Ok(self.tokens.lock().iter().find(|t| t.id == id).cloned())
    }
}
