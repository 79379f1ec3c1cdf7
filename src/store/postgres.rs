use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User, UserUpdate};

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed user store.
///
/// Expects the schema in `migrations/`, whose unique index on `username`
/// backs the [`StoreError::Conflict`] contract.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and wraps the resulting pool.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, active, created_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, role, active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, username, password_hash, role, active, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .bind(new_user.active)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(new_user.username)),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_fields(&self, username: &str, update: UserUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return match self.find_by_username(username).await? {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound(username.to_string())),
            };
        }

        // COALESCE keeps the stored value for fields the caller left unset.
        let result = sqlx::query(
            "UPDATE users
             SET role = COALESCE($1, role), active = COALESCE($2, active)
             WHERE username = $3",
        )
        .bind(update.role)
        .bind(update.active)
        .bind(username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(username.to_string()));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
