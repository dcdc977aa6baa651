use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::UserRow;

const USER_COLUMNS: &str = "id::text AS id, email, password_hash, role, created_at";

/// New account with an already hashed password.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the e-mail is taken.
    async fn create_user(&self, user: NewUser) -> Result<UserRow, DatabaseError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO \"users\" (email, password_hash, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DatabaseError::Conflict(format!("user {}", user.email))
                }
                other => DatabaseError::Sqlx(other),
            })?;
        info!("Created user {} ({})", row.id, row.role);
        Ok(row)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM \"users\" WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
