use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use dialoguer::{Input, Password};
use serde_json::json;

use crate::auth::ADMIN_ROLE;
use crate::cli::utils::{output_success, output_violations};
use crate::cli::OutputFormat;
use crate::database::{DatabaseManager, PgUserStore};
use crate::services::{UserError, UserService};
use crate::types::CreateUserParams;
use crate::validation::conditions::MIN_PASSWORD_LEN;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create an administrator account")]
    Create {
        #[arg(long, help = "E-mail address (will prompt if not provided)")]
        email: Option<String>,
        #[arg(long, default_value = ADMIN_ROLE, help = "Account role")]
        role: String,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create { email, role } => create(email, role, output_format).await,
    }
}

async fn create(email: Option<String>, role: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("E-mail").interact_text()?,
    };
    let password = Password::new()
        .with_prompt(format!("Password (at least {} characters)", MIN_PASSWORD_LEN))
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let pool = DatabaseManager::pool().context("database pool")?;
    let users = UserService::new(Arc::new(PgUserStore::new(pool)));

    match users.create_user(CreateUserParams { email, password, role }).await {
        Ok(user) => output_success(
            output_format,
            &format!("Created {} account {}", user.role, user.email),
            Some(json!(user)),
        ),
        Err(UserError::InvalidInput(errors)) => {
            output_violations(output_format, "Invalid account details", &errors.violations())?;
            anyhow::bail!("account not created")
        }
        Err(e) => Err(e).context("account not created"),
    }
}
