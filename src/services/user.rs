use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{self, Claims, JwtError};
use crate::database::{DatabaseError, NewUser, UserStore};
use crate::types::{CreateUserParams, SignInParams, User};
use crate::validation::{conditions, FieldError, ValidationErrors, Validator};

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationErrors),
    #[error("a user with this e-mail already exists")]
    UserExists,
    #[error("invalid e-mail or password")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error("user store failure: {0}")]
    Internal(#[source] DatabaseError),
}

impl From<DatabaseError> for UserError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Conflict(_) => UserError::UserExists,
            other => UserError::Internal(other),
        }
    }
}

/// Token issued by a successful sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub token: String,
    pub expires_at: i64,
    pub user: User,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, params: CreateUserParams) -> Result<User, UserError> {
        let params = params.sanitize();
        let mut v = Validator::new();
        v.register(conditions::email(&params.email), FieldError::InvalidEmail)
            .register(conditions::password(&params.password), FieldError::InvalidPassword)
            .register(conditions::role(&params.role), FieldError::InvalidRole);
        v.validate()?;

        let password_hash = auth::hash_password(&params.password)?;
        let row = self
            .store
            .create_user(NewUser {
                email: params.email,
                password_hash,
                role: params.role,
            })
            .await?;
        info!("Created {} account {}", row.role, row.email);
        Ok(row.into())
    }

    /// Unknown e-mails and wrong passwords fail the same way.
    pub async fn sign_in(&self, params: SignInParams) -> Result<SignedIn, UserError> {
        let email = params.email.trim().to_lowercase();
        let row = match self.store.user_by_email(&email).await? {
            Some(row) if password_matches(&params.password, &row.password_hash).await => row,
            _ => {
                warn!("Failed sign-in for {}", email);
                return Err(UserError::InvalidCredentials);
            }
        };

        let claims = Claims::new(row.id.clone(), row.email.clone(), row.role.clone());
        let token = auth::generate_jwt(&claims)?;
        Ok(SignedIn {
            token,
            expires_at: claims.exp,
            user: row.into(),
        })
    }
}

/// Verification runs on the blocking pool.
async fn password_matches(password: &str, stored: &str) -> bool {
    let (password, stored) = (password.to_string(), stored.to_string());
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &stored))
        .await
        .unwrap_or(false)
}
