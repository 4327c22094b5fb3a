use auth_session::{RefreshToken, RefreshTokenRepository};
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    /// Invalidate-then-insert inside one transaction. The UPDATE takes row
    /// locks on the active rows, so concurrent rotations for the same pair
    /// serialize instead of violating the single-active index.
    async fn rotate(
        &self,
        user_id: i64,
        device_id: &str,
        token_hash: &str,
    ) -> auth_session::Result<RefreshToken> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE refresh_tokens SET invalidated_at = NOW(), updated_at = NOW() \
             WHERE user_id = $1 AND device_id = $2 AND invalidated_at IS NULL",
        )
        .bind(user_id)
        .bind(device_id)
        .execute(&mut *tx)
        .await?;

        let token = sqlx::query_as::<_, RefreshToken>(
            "INSERT INTO refresh_tokens (user_id, device_id, token_hash) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, device_id, token_hash, created_at, updated_at, invalidated_at",
        )
        .bind(user_id)
        .bind(device_id)
        .bind(token_hash)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(token)
    }

    async fn find_active(
        &self,
        user_id: i64,
        device_id: &str,
    ) -> auth_session::Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, device_id, token_hash, created_at, updated_at, invalidated_at \
             FROM refresh_tokens \
             WHERE user_id = $1 AND device_id = $2 AND invalidated_at IS NULL",
        )
        .bind(user_id)
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn find_by_id(&self, id: i64) -> auth_session::Result<Option<RefreshToken>> {
        let token = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, device_id, token_hash, created_at, updated_at, invalidated_at \
             FROM refresh_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }
}
