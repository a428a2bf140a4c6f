//! Checkout platform webhook integration: signature scheme and event
//! envelope.
//!
//! The platform signs the raw body with HMAC-SHA256 and sends the digest
//! base64-encoded in the `x-checkout-hmac-sha256` header. Order amounts
//! arrive as decimal currency units and are converted to minor units
//! during normalization.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::models::{EventKind, PaymentEvent, Provider};

use super::NormalizedEvent;

type HmacSha256 = Hmac<Sha256>;

/// Signature header sent by the checkout platform.
pub const SIGNATURE_HEADER: &str = "x-checkout-hmac-sha256";

#[derive(Debug, Clone)]
pub struct CheckoutPlatformClient {
    webhook_secret: String,
}

impl CheckoutPlatformClient {
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
        }
    }

    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal("Invalid webhook secret".into()))?;
        mac.update(payload);
        let expected = BASE64.encode(mac.finalize().into_bytes());

        // Constant-time comparison; the length check leaks only the
        // digest length, which is fixed.
        let expected_bytes = expected.as_bytes();
        let provided_bytes = signature.as_bytes();

        if expected_bytes.len() != provided_bytes.len() {
            return Ok(false);
        }

        Ok(expected_bytes.ct_eq(provided_bytes).into())
    }

    /// Map a raw body into the provider-agnostic event.
    ///
    /// Only `order_paid` orders whose status is actually "paid" become
    /// payment events; everything else the platform sends (created,
    /// cancelled, refund notices) is ignored.
    pub fn normalize(&self, body: &[u8]) -> Result<NormalizedEvent> {
        let event: CheckoutWebhookEvent = serde_json::from_slice(body)?;

        if event.meta.event_name != "order_paid" {
            return Ok(NormalizedEvent::Ignored);
        }

        let attrs: CheckoutOrderAttributes = serde_json::from_value(event.data.attributes)?;

        if attrs.status != "paid" {
            return Ok(NormalizedEvent::Ignored);
        }

        let payer_email = attrs
            .user_email
            .ok_or_else(|| AppError::BadRequest("Order missing user email".into()))?;

        // The platform reports decimal currency units (e.g. 212.99);
        // the rule table is integer-exact in minor units.
        let amount_minor = (attrs.total * 100.0).round() as i64;

        Ok(NormalizedEvent::Payment(PaymentEvent {
            provider: Provider::CheckoutPlatform,
            external_transaction_id: event.data.id,
            payer_email,
            amount_minor,
            occurred_at: attrs.created_at,
            kind: EventKind::Succeeded,
        }))
    }
}

/// Generic checkout platform webhook event - attributes parsed based on
/// the event name.
#[derive(Debug, Deserialize)]
pub struct CheckoutWebhookEvent {
    pub meta: CheckoutMeta,
    pub data: CheckoutEventData,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutMeta {
    pub event_name: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutEventData {
    /// The platform's transaction id, unique per order.
    pub id: String,
    pub attributes: serde_json::Value,
}

// ============ order_paid ============

#[derive(Debug, Deserialize)]
pub struct CheckoutOrderAttributes {
    pub status: String,
    pub user_email: Option<String>,
    /// Order total in decimal currency units.
    pub total: f64,
    /// Unix timestamp of the order.
    pub created_at: i64,
}
