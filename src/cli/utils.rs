use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format. Keys of `data` are
/// merged into the JSON object.
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Value::Object(target)) = (data, &mut response) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a skipped step, e.g. fixtures already loaded.
pub fn output_skipped(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "success": true, "skipped": true, "message": message }))?
            );
        }
        OutputFormat::Text => {
            println!("- {}", message);
        }
    }
    Ok(())
}
