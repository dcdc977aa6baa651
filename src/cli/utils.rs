use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::validation::FieldViolation;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data) = data {
                response["data"] = data;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output rejected fields in the appropriate format
pub fn output_violations(
    output_format: OutputFormat,
    message: &str,
    violations: &[FieldViolation],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": false,
                "error": message,
                "field_errors": violations
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            for v in violations {
                eprintln!("  {}: {}", v.field, v.message);
            }
        }
    }
    Ok(())
}
