use serde::Serialize;

use super::Provider;

/// Durable proof that a `(provider, external_transaction_id)` pair has
/// been reconciled, plus enough event context for manual follow-up when
/// the outcome was not a grant. Append-only; rows are never deleted, so
/// idempotency survives process restarts.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedTransaction {
    pub id: String,
    pub provider: Provider,
    pub external_transaction_id: String,
    pub payer_email: String,
    pub amount_minor: i64,
    /// Set only when the outcome is `granted`.
    pub credits_granted: Option<i64>,
    /// 'granted', 'no_rule', or 'unknown_payer' once terminal; 'claimed'
    /// is only ever visible inside the reconciliation transaction.
    pub outcome: String,
    pub occurred_at: i64,
    pub created_at: i64,
}
