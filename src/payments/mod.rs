pub mod card_processor;
pub mod checkout_platform;

pub use card_processor::CardProcessorClient;
pub use checkout_platform::CheckoutPlatformClient;

use crate::models::PaymentEvent;

/// Result of normalizing a raw webhook body.
#[derive(Debug)]
pub enum NormalizedEvent {
    /// A payment notification the reconciliation pipeline should see.
    Payment(PaymentEvent),
    /// An event kind this service does not act on; acknowledged and
    /// dropped.
    Ignored,
}
