use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
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

/// Print a bare value: pretty JSON, or the raw string in text mode
pub fn output_value(output_format: OutputFormat, value: &Value) -> anyhow::Result<()> {
    match (output_format, value) {
        (OutputFormat::Text, Value::String(text)) => println!("{}", text),
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
