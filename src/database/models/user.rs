use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::User;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
        }
    }
}
