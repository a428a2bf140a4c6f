//! Common webhook handling infrastructure for payment providers.
//!
//! A trait-based approach unifies the two provider handlers: each
//! implementation supplies signature extraction, verification, and
//! normalization, while `handle_webhook` drives the shared pipeline
//! verify -> normalize -> reconcile.

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
};

use crate::billing::{reconcile, ReconcileOutcome};
use crate::db::AppState;
use crate::models::Provider;
use crate::payments::NormalizedEvent;

/// Result type for webhook operations.
pub type WebhookResult = (StatusCode, &'static str);

/// Trait for payment provider webhook handling.
pub trait WebhookProvider: Send + Sync {
    /// Which provider this handler speaks for.
    fn provider(&self) -> Provider;

    /// Extract the signature from request headers.
    fn extract_signature(&self, headers: &HeaderMap) -> Result<String, WebhookResult>;

    /// Verify the signature over the raw body.
    fn verify_signature(&self, body: &Bytes, signature: &str) -> Result<bool, WebhookResult>;

    /// Parse the raw body into a provider-agnostic event.
    fn parse_event(&self, body: &Bytes) -> crate::error::Result<NormalizedEvent>;
}

/// Generic webhook handler that delegates to provider-specific
/// implementations.
///
/// Status discipline: 400 only for a missing or failed signature. Every
/// other terminal state - including duplicates, unknown amounts, and
/// malformed payloads - acknowledges with 200 so the provider stops
/// retrying things a retry cannot fix.
pub async fn handle_webhook<P: WebhookProvider>(
    provider: &P,
    state: &AppState,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResult {
    let signature = match provider.extract_signature(&headers) {
        Ok(s) => s,
        Err(e) => return e,
    };

    // Verification runs over the raw bytes, before any JSON parsing. An
    // unverified event must never reach the idempotency guard or the
    // ledger.
    match provider.verify_signature(&body, &signature) {
        Ok(true) => {}
        Ok(false) => return (StatusCode::BAD_REQUEST, "Invalid signature"),
        Err(e) => return e,
    }

    let event = match provider.parse_event(&body) {
        Ok(NormalizedEvent::Payment(event)) => event,
        Ok(NormalizedEvent::Ignored) => return (StatusCode::OK, "Event ignored"),
        Err(e) => {
            // A retry redelivers the same signed bytes, so a non-2xx here
            // would just loop; log and acknowledge.
            tracing::error!(
                "Failed to parse {} webhook: {}",
                provider.provider(),
                e
            );
            return (StatusCode::OK, "Malformed payload");
        }
    };

    let mut conn = match state.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("DB connection error: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    };

    match reconcile(&mut conn, &state.rules, &event) {
        Ok(ReconcileOutcome::Granted { .. }) => (StatusCode::OK, "OK"),
        Ok(ReconcileOutcome::AlreadyProcessed) => (StatusCode::OK, "Already processed"),
        Ok(ReconcileOutcome::FailedEvent) => (StatusCode::OK, "Failed event logged"),
        Ok(ReconcileOutcome::NoMatchingRule) => (StatusCode::OK, "No matching rule"),
        Ok(ReconcileOutcome::UnknownPayer) => (StatusCode::OK, "Unknown payer"),
        Err(e) => {
            // 5xx is the one case where a provider retry genuinely helps:
            // the claim rolled back with the transaction.
            tracing::error!(
                "Failed to reconcile {} transaction {}: {}",
                event.provider,
                event.external_transaction_id,
                e
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Reconciliation failed")
        }
    }
}
