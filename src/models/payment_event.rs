use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// External payment provider originating webhook notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    CardProcessor,
    CheckoutPlatform,
}

impl Provider {
    /// Name used for logging and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardProcessor => "card_processor",
            Self::CheckoutPlatform => "checkout_platform",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card_processor" => Ok(Self::CardProcessor),
            "checkout_platform" => Ok(Self::CheckoutPlatform),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Whether the provider reports the payment as completed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Succeeded,
    Failed,
}

/// Provider-agnostic representation of one webhook notification.
///
/// Built once per delivery by the provider-specific normalizer and never
/// mutated. Providers redeliver on non-2xx or timeout, so identical events
/// can arrive many times; `external_transaction_id` is the deduplication
/// key (scoped per provider).
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    pub provider: Provider,
    pub external_transaction_id: String,
    pub payer_email: String,
    /// Amount in minor units (cents).
    pub amount_minor: i64,
    /// Unix timestamp reported by the provider.
    pub occurred_at: i64,
    pub kind: EventKind,
}
