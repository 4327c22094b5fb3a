use auth_session::{AuthError, NewUser, User, UserRepository};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, email, display_name, password_hash, role, preferences";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> auth_session::Result<User> {
        let query = format!(
            "INSERT INTO users (email, display_name, password_hash, role, preferences) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&user.email)
            .bind(&user.display_name)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(Json(&user.preferences))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                // Races past the service-level pre-check land here.
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    AuthError::EmailAlreadyInUse
                } else {
                    AuthError::Database(e)
                }
            })
    }

    async fn find_by_id(&self, id: i64) -> auth_session::Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> auth_session::Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list(&self) -> auth_session::Result<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");

        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn update(&self, user: &User) -> auth_session::Result<()> {
        let result = sqlx::query(
            "UPDATE users SET email = $1, display_name = $2, role = $3, preferences = $4 \
             WHERE id = $5",
        )
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(Json(&user.preferences))
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }
}
