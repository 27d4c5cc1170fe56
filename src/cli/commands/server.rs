use anyhow::Context;
use clap::Subcommand;
use serde_json::{json, Value};
use std::time::Duration;

use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from API /health endpoint")]
    Health {
        #[arg(long, help = "Server base URL (defaults to the configured local address)")]
        url: Option<String>,
    },

    #[command(about = "Show server information from API root endpoint")]
    Info {
        #[arg(long, help = "Server base URL (defaults to the configured local address)")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => {
            let base = url.unwrap_or_else(default_base_url);
            let body = fetch_json(&format!("{}/health", base.trim_end_matches('/'))).await?;
            let status = body["status"].as_str().unwrap_or("unknown");
            if status != "ok" {
                anyhow::bail!("{} reported status {}", base, status);
            }
            output_success(output_format, &format!("{} is healthy", base), Some(json!({ "url": base, "health": body })))
        }
        ServerCommands::Info { url } => {
            let base = url.unwrap_or_else(default_base_url);
            let body = fetch_json(&format!("{}/", base.trim_end_matches('/'))).await?;
            output_value(output_format, &body)
        }
    }
}

fn default_base_url() -> String {
    format!("http://localhost:{}", config().server.port)
}

async fn fetch_json(url: &str) -> anyhow::Result<Value> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
    let response = client.get(url).send().await.with_context(|| format!("failed to reach {}", url))?;
    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("{} returned HTTP {}", url, status);
    }
    response.json().await.with_context(|| format!("{} did not return JSON", url))
}
