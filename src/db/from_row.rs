//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupted rows.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const USER_COLS: &str = "id, email, name, public_token, credits, created_at, updated_at";

pub const PAGE_COLS: &str = "id, owner_id, title, slug, color, image, description, created_at";

/// Page columns qualified for joins against users.
pub const PAGE_COLS_QUALIFIED: &str =
    "p.id, p.owner_id, p.title, p.slug, p.color, p.image, p.description, p.created_at";

pub const PROCESSED_TX_COLS: &str = "id, provider, external_transaction_id, payer_email, amount_minor, credits_granted, outcome, occurred_at, created_at";

// ============ FromRow Implementations ============

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            public_token: row.get(3)?,
            credits: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl FromRow for Page {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Page {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            slug: row.get(3)?,
            color: row.get(4)?,
            image: row.get(5)?,
            description: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

impl FromRow for ProcessedTransaction {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(ProcessedTransaction {
            id: row.get(0)?,
            provider: parse_enum(row, 1, "provider")?,
            external_transaction_id: row.get(2)?,
            payer_email: row.get(3)?,
            amount_minor: row.get(4)?,
            credits_granted: row.get(5)?,
            outcome: row.get(6)?,
            occurred_at: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}
