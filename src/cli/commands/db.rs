use anyhow::Context;
use clap::Subcommand;

use crate::cli::{utils::output_success, OutputFormat};
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply pending migrations")]
    Migrate,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Migrate => {
            DatabaseManager::migrate().await.context("migration failed")?;
            output_success(output_format, "Migrations applied", None)
        }
    }
}
