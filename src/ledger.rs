//! Authoritative store of user credit balances.
//!
//! Every mutation is a single conditional UPDATE, so concurrent credits
//! and debits for one user serialize on the database write lock and a
//! read-modify-write race cannot lose an update or drive the balance
//! negative. No other module writes the `credits` column.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{AppError, Result};

/// Result of a credit grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditOutcome {
    Credited { balance: i64 },
    UserNotFound,
}

/// Result of a debit attempt. `InsufficientCredits` carries the observed
/// balance so callers can report it without a second query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Debited { balance: i64 },
    InsufficientCredits { balance: i64 },
    UserNotFound,
}

fn now() -> i64 {
    Utc::now().timestamp()
}

fn check_amount(amount: i64) -> Result<()> {
    if amount < 0 {
        return Err(AppError::BadRequest("Amount must be non-negative".into()));
    }
    Ok(())
}

/// Atomically increment a user's balance. Returns the new balance.
pub fn credit(conn: &Connection, user_id: &str, amount: i64) -> Result<CreditOutcome> {
    check_amount(amount)?;

    let new_balance: Option<i64> = conn
        .query_row(
            "UPDATE users SET credits = credits + ?1, updated_at = ?2
             WHERE id = ?3
             RETURNING credits",
            params![amount, now(), user_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(match new_balance {
        Some(balance) => CreditOutcome::Credited { balance },
        None => CreditOutcome::UserNotFound,
    })
}

/// Atomically decrement a user's balance, but only if the balance covers
/// the amount. The guard lives in the WHERE clause: the balance is never
/// observable below zero, and a losing concurrent debit simply matches
/// no row.
pub fn debit(conn: &Connection, user_id: &str, amount: i64) -> Result<DebitOutcome> {
    check_amount(amount)?;

    let new_balance: Option<i64> = conn
        .query_row(
            "UPDATE users SET credits = credits - ?1, updated_at = ?2
             WHERE id = ?3 AND credits >= ?1
             RETURNING credits",
            params![amount, now(), user_id],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(balance) = new_balance {
        return Ok(DebitOutcome::Debited { balance });
    }

    // No row matched: either the user does not exist or the balance is
    // short. Distinguish for the caller.
    Ok(match balance(conn, user_id)? {
        Some(balance) => DebitOutcome::InsufficientCredits { balance },
        None => DebitOutcome::UserNotFound,
    })
}

/// Read a user's current balance. `None` if the user does not exist.
pub fn balance(conn: &Connection, user_id: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT credits FROM users WHERE id = ?1",
        params![user_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}
