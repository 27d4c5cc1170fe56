//! Payment provider clients and signature helpers.

pub mod paypal;
pub mod paytr;
pub mod stripe;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::config::AppConfig;

pub use paypal::PayPalClient;
pub use paytr::PayTrClient;
pub use stripe::StripeClient;

pub(crate) type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Carries the full client-facing message.
    #[error("{0}")]
    NotConfigured(String),

    #[error("{provider} error: {message}")]
    Provider { provider: &'static str, message: String },

    #[error("{0}")]
    InvalidSignature(String),

    #[error("Payment not completed: {0}")]
    Declined(String),

    #[error("Payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

/// The provider clients, sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct PaymentClients {
    pub stripe: StripeClient,
    pub paypal: PayPalClient,
    pub paytr: PayTrClient,
}

impl PaymentClients {
    pub fn new(client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            stripe: StripeClient::new(client.clone(), config.stripe.clone()),
            paypal: PayPalClient::new(client.clone(), config.paypal.clone()),
            paytr: PayTrClient::new(client, config.paytr.clone()),
        }
    }
}

pub(crate) fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, PaymentError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|_| PaymentError::InvalidSignature("Invalid signing key".to_string()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_known_vector() {
        // RFC 4231 test case 2
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }
}
