//! User repository for database operations.

use async_trait::async_trait;
use domain::models::{NewUser, User};
use domain::store::UserStore;
use domain::{StoreError, StoreResult};
use sqlx::PgPool;

use crate::entities::UserEntity;
use crate::error::map_db_error;
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str =
    "id, email, display_name, team_id, role, is_app_admin, disabled, created_at, updated_at";

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_flag(&self, query_name: &str, column: &str, id: &str, value: bool) -> StoreResult<User> {
        let timer = QueryTimer::new(query_name);
        let query = format!(
            "UPDATE users SET {column} = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, UserEntity>(&query)
            .bind(id)
            .bind(value)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
            .map_err(map_db_error)?
            .map(User::from)
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        let timer = QueryTimer::new("find_user");
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let result = sqlx::query_as::<_, UserEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let timer = QueryTimer::new("find_user_by_email");
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let result = sqlx::query_as::<_, UserEntity>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.map(User::from))
    }

    async fn upsert_user(&self, user: NewUser) -> StoreResult<User> {
        let timer = QueryTimer::new("upsert_user");
        let query = format!(
            r#"
            INSERT INTO users (id, email, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                updated_at = NOW()
            RETURNING {USER_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, UserEntity>(&query)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.display_name)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.into())
    }

    async fn set_app_admin(&self, id: &str, is_app_admin: bool) -> StoreResult<User> {
        self.set_flag("set_app_admin", "is_app_admin", id, is_app_admin)
            .await
    }

    async fn set_disabled(&self, id: &str, disabled: bool) -> StoreResult<User> {
        self.set_flag("set_disabled", "disabled", id, disabled).await
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let timer = QueryTimer::new("delete_user");
        // Memberships cascade with the user row.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(map_db_error)?.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_db_error)
    }
}
