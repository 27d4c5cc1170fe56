use clap::Subcommand;
use serde_json::json;

use crate::auth::issue_token;
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Print a JWT signed with JWT_SECRET")]
    Mint {
        #[arg(long, help = "User id placed in the `sub` claim")]
        user_id: String,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint { user_id, email, hours } => {
            let mut security = config().security.clone();
            if let Some(hours) = hours {
                security.jwt_expiry_hours = hours;
            }

            let token = issue_token(&user_id, email.as_deref(), &security)?;
            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    "Token minted",
                    Some(json!({
                        "access_token": token,
                        "token_type": "bearer",
                        "user_id": user_id,
                        "expires_in_hours": security.jwt_expiry_hours
                    })),
                ),
                OutputFormat::Text => output_value(output_format, &json!(token)),
            }
        }
    }
}
