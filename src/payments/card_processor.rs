//! Card processor webhook integration: signature scheme and event
//! envelope.
//!
//! The processor signs each delivery with a timestamp-prefixed
//! HMAC-SHA256 over the raw body, carried in the `x-cp-signature` header
//! as `t=<unix>,v1=<hex>`. The timestamp is bounded on both sides to keep
//! captured deliveries from being replayed later.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::models::{EventKind, PaymentEvent, Provider};

use super::NormalizedEvent;

type HmacSha256 = Hmac<Sha256>;

/// Signature header sent by the card processor.
pub const SIGNATURE_HEADER: &str = "x-cp-signature";

#[derive(Debug, Clone)]
pub struct CardProcessorClient {
    webhook_secret: String,
}

impl CardProcessorClient {
    /// Maximum age of a webhook timestamp before it's rejected (in seconds).
    const WEBHOOK_TIMESTAMP_TOLERANCE_SECS: i64 = 300;

    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
        }
    }

    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        // Signature format: t=timestamp,v1=signature
        let parts: Vec<&str> = signature.split(',').collect();

        let mut timestamp = None;
        let mut sig_v1 = None;

        for part in parts {
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(s) = part.strip_prefix("v1=") {
                sig_v1 = Some(s);
            }
        }

        let timestamp_str =
            timestamp.ok_or_else(|| AppError::BadRequest("Invalid signature format".into()))?;
        let sig_v1 =
            sig_v1.ok_or_else(|| AppError::BadRequest("Invalid signature format".into()))?;

        // Parse and validate timestamp to prevent replay of captured
        // deliveries beyond the tolerance window.
        let timestamp: i64 = timestamp_str
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid timestamp in signature".into()))?;

        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS {
            tracing::warn!(
                "Card processor webhook rejected: timestamp too old (age={}s, max={}s)",
                age,
                Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS
            );
            return Ok(false);
        }

        // Clock skew tolerance for timestamps from the future: 60 seconds
        if age < -60 {
            tracing::warn!(
                "Card processor webhook rejected: timestamp in the future (age={}s)",
                age
            );
            return Ok(false);
        }

        let signed_payload = format!("{}.{}", timestamp_str, String::from_utf8_lossy(payload));

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal("Invalid webhook secret".into()))?;
        mac.update(signed_payload.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        // Constant-time comparison so response timing leaks nothing about
        // the expected signature. The length check is not constant-time,
        // but signature length is not secret (64 hex chars for SHA-256).
        let expected_bytes = expected.as_bytes();
        let provided_bytes = sig_v1.as_bytes();

        if expected_bytes.len() != provided_bytes.len() {
            return Ok(false);
        }

        Ok(expected_bytes.ct_eq(provided_bytes).into())
    }

    /// Map a raw body into the provider-agnostic event.
    ///
    /// `charge.succeeded` and `charge.failed` become payment events
    /// (failed ones carry `EventKind::Failed` and are logged downstream,
    /// never credited); every other event type is ignored.
    pub fn normalize(&self, body: &[u8]) -> Result<NormalizedEvent> {
        let event: CardProcessorWebhookEvent = serde_json::from_slice(body)?;

        let kind = match event.event_type.as_str() {
            "charge.succeeded" => EventKind::Succeeded,
            "charge.failed" => EventKind::Failed,
            _ => return Ok(NormalizedEvent::Ignored),
        };

        let charge: CardCharge = serde_json::from_value(event.data.object)?;

        let payer_email = charge
            .billing_details
            .and_then(|d| d.email)
            .ok_or_else(|| AppError::BadRequest("Charge missing billing email".into()))?;

        Ok(NormalizedEvent::Payment(PaymentEvent {
            provider: Provider::CardProcessor,
            external_transaction_id: charge.id,
            payer_email,
            amount_minor: charge.amount,
            occurred_at: charge.created,
            kind,
        }))
    }
}

/// Generic card processor webhook event - object is parsed based on
/// the event type.
#[derive(Debug, Deserialize)]
pub struct CardProcessorWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: CardProcessorEventData,
}

#[derive(Debug, Deserialize)]
pub struct CardProcessorEventData {
    pub object: serde_json::Value,
}

// ============ charge.succeeded / charge.failed ============

#[derive(Debug, Deserialize)]
pub struct CardCharge {
    pub id: String,
    /// Amount in minor units (cents).
    pub amount: i64,
    /// Unix timestamp of the charge.
    pub created: i64,
    pub billing_details: Option<CardBillingDetails>,
}

#[derive(Debug, Deserialize)]
pub struct CardBillingDetails {
    pub email: Option<String>,
}
