use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::build_templates;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::schemas::NewTemplate;
use crate::services::{Store, SupabaseClient};

pub const DEFAULT_OUTPUT: &str = "supabase/generated_templates.json";

#[derive(Subcommand)]
pub enum TemplateCommands {
    #[command(about = "Write the built-in template catalog as JSON")]
    Build {
        #[arg(long, default_value = DEFAULT_OUTPUT, help = "Output file")]
        output: PathBuf,
    },

    #[command(about = "Upsert templates into Supabase (built-in catalog unless --input is given)")]
    Seed {
        #[arg(long, help = "Catalog JSON file produced by `templates build`")]
        input: Option<PathBuf>,
    },
}

pub async fn handle(cmd: TemplateCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TemplateCommands::Build { output } => {
            let templates = build_templates();
            write_catalog(&output, &templates)?;
            output_success(
                output_format,
                &format!("Generated {} templates -> {}", templates.len(), output.display()),
                Some(json!({ "count": templates.len(), "path": output.display().to_string() })),
            )
        }
        TemplateCommands::Seed { input } => {
            let templates = match input {
                Some(path) => read_catalog(&path)?,
                None => build_templates(),
            };

            let config = config();
            let supabase = SupabaseClient::new(&config.supabase, config.openai.request_timeout_secs)
                .context("SUPABASE_URL and SUPABASE_SERVICE_KEY are required to seed templates")?;
            let count = supabase.upsert_templates(&templates).await.context("failed to upsert templates")?;
            tracing::info!("Seeded {} templates", count);

            output_success(output_format, &format!("Seeded {} templates", count), Some(json!({ "count": count })))
        }
    }
}

pub fn write_catalog(path: &Path, templates: &[NewTemplate]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(templates)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

pub fn read_catalog(path: &Path) -> anyhow::Result<Vec<NewTemplate>> {
    let body = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| format!("{} is not a template catalog", path.display()))
}
