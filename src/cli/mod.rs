pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "surfspots")]
#[command(about = "Surf spots CLI - administration for the surf spot directory")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Administrator accounts")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Spot data operations")]
    Spots {
        #[command(subcommand)]
        cmd: commands::spots::SpotsCommands,
    },

    #[command(about = "Database maintenance")]
    Db {
        #[command(subcommand)]
        cmd: commands::db::DbCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Admin { cmd } => commands::admin::handle(cmd, output_format).await,
        Commands::Spots { cmd } => commands::spots::handle(cmd, output_format).await,
        Commands::Db { cmd } => commands::db::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::try_parse_from(["surfspots", "db", "migrate", "--json"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
    }

    #[test]
    fn admin_create_defaults_to_admin_role() {
        let cli = Cli::try_parse_from(["surfspots", "admin", "create", "--email", "a@b.co"]).unwrap();
        match cli.command {
            Commands::Admin { cmd: commands::admin::AdminCommands::Create { email, role } } => {
                assert_eq!(email.as_deref(), Some("a@b.co"));
                assert_eq!(role, "admin");
            }
            _ => panic!("parsed the wrong command"),
        }
    }

    #[test]
    fn import_requires_a_file() {
        assert!(Cli::try_parse_from(["surfspots", "spots", "import"]).is_err());
    }
}
