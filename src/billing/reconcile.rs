//! Converts a verified, normalized payment event into an exactly-once
//! credit grant.
//!
//! The whole state machine for one event runs inside a single database
//! transaction: claim, rule lookup, payer lookup, grant, outcome record.
//! If any step fails the claim rolls back with everything else, so the
//! provider's retry gets a clean second attempt; once the transaction
//! commits, every redelivery lands on `AlreadyProcessed`.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::ledger::{self, CreditOutcome};
use crate::models::{EventKind, PaymentEvent};

use super::CreditRuleTable;

/// Terminal state of reconciling one delivery. Each maps to an HTTP 200
/// acknowledgement - providers must not retry any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Credits granted to the payer's balance.
    Granted { credits: i64, balance: i64 },
    /// This transaction id was already reconciled; nothing happened.
    AlreadyProcessed,
    /// Provider reported a failed payment; recorded in the log only.
    FailedEvent,
    /// No tariff entry for this (provider, amount); recorded for manual
    /// follow-up, no balance touched.
    NoMatchingRule,
    /// Payer email does not match any user; recorded for manual
    /// reconciliation, never discarded silently.
    UnknownPayer,
}

pub fn reconcile(
    conn: &mut Connection,
    rules: &CreditRuleTable,
    event: &PaymentEvent,
) -> Result<ReconcileOutcome> {
    if event.kind == EventKind::Failed {
        tracing::info!(
            "{} payment failed: transaction={}, amount={}, email={}",
            event.provider,
            event.external_transaction_id,
            event.amount_minor,
            event.payer_email
        );
        return Ok(ReconcileOutcome::FailedEvent);
    }

    let tx = conn.transaction()?;

    if !queries::try_claim_transaction(&tx, event)? {
        // Expected under at-least-once delivery, not an error.
        tracing::debug!(
            "{} duplicate delivery: transaction={}",
            event.provider,
            event.external_transaction_id
        );
        return Ok(ReconcileOutcome::AlreadyProcessed);
    }

    let Some(credits) = rules.lookup(event.provider, event.amount_minor) else {
        // Likely a tariff mismatch; keep the claim so retries stay inert
        // and the recorded row carries the context for manual follow-up.
        queries::finalize_transaction(
            &tx,
            event.provider,
            &event.external_transaction_id,
            "no_rule",
            None,
        )?;
        tx.commit()?;
        tracing::warn!(
            "{} payment with no matching rule: transaction={}, amount={}, email={}",
            event.provider,
            event.external_transaction_id,
            event.amount_minor,
            event.payer_email
        );
        return Ok(ReconcileOutcome::NoMatchingRule);
    };

    let payer = queries::find_user_by_email(&tx, &event.payer_email)?;
    let outcome = match payer {
        Some(user) => ledger::credit(&tx, &user.id, credits)?,
        None => CreditOutcome::UserNotFound,
    };

    match outcome {
        CreditOutcome::Credited { balance } => {
            queries::finalize_transaction(
                &tx,
                event.provider,
                &event.external_transaction_id,
                "granted",
                Some(credits),
            )?;
            tx.commit()?;
            tracing::info!(
                "{} payment reconciled: transaction={}, amount={}, credits={}, balance={}",
                event.provider,
                event.external_transaction_id,
                event.amount_minor,
                credits,
                balance
            );
            Ok(ReconcileOutcome::Granted { credits, balance })
        }
        CreditOutcome::UserNotFound => {
            queries::finalize_transaction(
                &tx,
                event.provider,
                &event.external_transaction_id,
                "unknown_payer",
                None,
            )?;
            tx.commit()?;
            tracing::warn!(
                "{} payment from unknown email: transaction={}, amount={}, email={}",
                event.provider,
                event.external_transaction_id,
                event.amount_minor,
                event.payer_email
            );
            Ok(ReconcileOutcome::UnknownPayer)
        }
    }
}
