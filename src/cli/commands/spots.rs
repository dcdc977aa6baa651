use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_success, output_violations};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseManager, PgSpotStore};
use crate::geocoding::NominatimClient;
use crate::services::{import_violations, ManagementError, ManagementService};
use crate::types::CreateSpotParams;

#[derive(Subcommand)]
pub enum SpotsCommands {
    #[command(about = "Import spots from a JSON array file")]
    Import {
        #[arg(help = "Path to a JSON array of spots")]
        file: PathBuf,
    },
}

pub async fn handle(cmd: SpotsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SpotsCommands::Import { file } => import(file, output_format).await,
    }
}

fn read_entries(file: &Path) -> anyhow::Result<Vec<CreateSpotParams>> {
    let raw = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON array of spots", file.display()))
}

async fn import(file: PathBuf, output_format: OutputFormat) -> anyhow::Result<()> {
    let entries = read_entries(&file)?;
    let total = entries.len();

    let config = config::config();
    let pool = DatabaseManager::pool().context("database pool")?;
    let management = ManagementService::new(
        Arc::new(PgSpotStore::new(pool, config.import.batch_size)),
        Arc::new(NominatimClient::new(&config.geocoding)?),
    );

    match management.import_spots(entries).await {
        Ok(imported) => output_success(
            output_format,
            &format!("Imported {} of {} spots from {}", imported, total, file.display()),
            Some(json!({ "imported": imported })),
        ),
        Err(ManagementError::InvalidImportEntries(rejected)) => {
            let message = format!("{} of {} entries are invalid", rejected.len(), total);
            output_violations(output_format, &message, &import_violations(&rejected))?;
            anyhow::bail!("nothing imported")
        }
        Err(e) => Err(e).context("nothing imported"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_spot_array() {
        let path = std::env::temp_dir().join(format!("surfspots-import-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"name":"Supertubos","location":{"locality":"Peniche","country_code":"pt",
                "coordinates":{"latitude":39.345,"longitude":-9.366}}}]"#,
        )
        .unwrap();

        let entries = read_entries(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].location.locality, "Peniche");
    }

    #[test]
    fn rejects_non_arrays() {
        let path = std::env::temp_dir().join(format!("surfspots-import-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"name":"x"}"#).unwrap();

        let result = read_entries(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
