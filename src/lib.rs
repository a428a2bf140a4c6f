//! Pagelure - credit ledger and payment reconciliation backend for
//! trackable pages.
//!
//! Users hold a prepaid credit balance. Two external payment providers
//! deliver webhook notifications that are verified, normalized,
//! deduplicated, and converted into exactly-once credit grants; page
//! creation debits the balance under a non-negativity invariant.

pub mod billing;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod id;
pub mod ledger;
pub mod models;
pub mod payments;
