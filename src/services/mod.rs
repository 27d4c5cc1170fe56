// services/mod.rs - Backends behind the handlers: storage, identity, AI, payments

pub mod identity;
pub mod local_identity;
pub mod memory;
pub mod openai;
pub mod payments;
pub mod store;
pub mod supabase;

use std::time::Duration;
use thiserror::Error;

pub use identity::{AuthSession, IdentityProvider, IdentityUser, SignUpOutcome};
pub use local_identity::LocalIdentity;
pub use memory::MemoryStore;
pub use openai::{AiError, ChartAi, OpenAiClient};
pub use store::Store;
pub use supabase::SupabaseClient;

/// Errors raised by the storage and identity backends.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The backend understood the request and refused it (bad credentials,
    /// duplicate account, ...). The message is safe to show to clients.
    #[error("{0}")]
    Rejected(String),
}

/// Builds the shared outbound HTTP client.
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("graphzy-api/", env!("CARGO_PKG_VERSION")))
        .build()
}
