use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{AppError, Result};
use crate::id::{gen_public_token, EntityType};
use crate::ledger::{self, DebitOutcome};
use crate::models::*;

use super::from_row::{
    query_all, query_one, PAGE_COLS, PAGE_COLS_QUALIFIED, PROCESSED_TX_COLS, USER_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Users ============

pub fn create_user(conn: &Connection, input: &CreateUser) -> Result<User> {
    validate_email_format(&input.email)?;

    let user = User {
        id: EntityType::User.gen_id(),
        email: input.email.trim().to_string(),
        name: input.name.clone(),
        public_token: gen_public_token(),
        credits: 0,
        created_at: now(),
        updated_at: now(),
    };

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, email, name, public_token, credits, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id,
            user.email,
            user.name,
            user.public_token,
            user.credits,
            user.created_at,
            user.updated_at
        ],
    )?;

    if inserted == 0 {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    Ok(user)
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        &[&id],
    )
}

/// Resolve the payer's email from a webhook to an internal balance holder.
pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE email = ?1", USER_COLS),
        &[&email.trim()],
    )
}

pub fn find_user_by_public_token(conn: &Connection, token: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE public_token = ?1", USER_COLS),
        &[&token],
    )
}

// ============ Processed Transactions (idempotency guard) ============

/// Atomically claim a `(provider, external_transaction_id)` pair.
///
/// Returns true if this caller is the unique processor of the pair. The
/// conditional insert rides on the compound UNIQUE constraint - never a
/// check-then-insert pair, so two concurrent deliveries cannot both win.
/// Run inside the reconciliation transaction: a rollback releases the
/// claim so the provider's retry can complete an interrupted grant.
pub fn try_claim_transaction(conn: &Connection, event: &PaymentEvent) -> Result<bool> {
    let affected = conn.execute(
        "INSERT OR IGNORE INTO processed_transactions
         (id, provider, external_transaction_id, payer_email, amount_minor, credits_granted, outcome, occurred_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, NULL, 'claimed', ?6, ?7)",
        params![
            EntityType::Recharge.gen_id(),
            event.provider.as_str(),
            event.external_transaction_id,
            event.payer_email,
            event.amount_minor,
            event.occurred_at,
            now()
        ],
    )?;
    Ok(affected > 0)
}

/// Record the terminal outcome of a claimed transaction.
pub fn finalize_transaction(
    conn: &Connection,
    provider: Provider,
    external_transaction_id: &str,
    outcome: &str,
    credits_granted: Option<i64>,
) -> Result<()> {
    conn.execute(
        "UPDATE processed_transactions SET outcome = ?1, credits_granted = ?2
         WHERE provider = ?3 AND external_transaction_id = ?4",
        params![outcome, credits_granted, provider.as_str(), external_transaction_id],
    )?;
    Ok(())
}

pub fn get_processed_transaction(
    conn: &Connection,
    provider: Provider,
    external_transaction_id: &str,
) -> Result<Option<ProcessedTransaction>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM processed_transactions WHERE provider = ?1 AND external_transaction_id = ?2",
            PROCESSED_TX_COLS
        ),
        &[&provider.as_str(), &external_transaction_id],
    )
}

pub fn count_processed_transactions(
    conn: &Connection,
    provider: Provider,
    external_transaction_id: &str,
) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM processed_transactions WHERE provider = ?1 AND external_transaction_id = ?2",
        params![provider.as_str(), external_transaction_id],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

// ============ Pages ============

/// Result of an attempted page creation.
#[derive(Debug)]
pub enum PageCreation {
    Created { page: Page, balance: i64 },
    SlugTaken,
    InsufficientCredits { balance: i64 },
}

/// Create a page, debiting the owner's balance in the same transaction.
///
/// Order matters: the slug collision check runs before the debit so a
/// rejected creation is never charged. The UNIQUE(owner_id, slug)
/// constraint backstops the race the explicit check cannot close; if it
/// fires, the rollback also reverts the debit. Either the debit and the
/// page row both land, or neither does.
pub fn create_page(
    conn: &mut Connection,
    owner_id: &str,
    input: &CreatePage,
    cost: i64,
) -> Result<PageCreation> {
    let tx = conn.transaction()?;

    let slug_taken: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM pages WHERE owner_id = ?1 AND slug = ?2",
            params![owner_id, input.slug],
            |row| row.get(0),
        )
        .optional()?;
    if slug_taken.is_some() {
        return Ok(PageCreation::SlugTaken);
    }

    let balance = match ledger::debit(&tx, owner_id, cost)? {
        DebitOutcome::Debited { balance } => balance,
        DebitOutcome::InsufficientCredits { balance } => {
            return Ok(PageCreation::InsufficientCredits { balance });
        }
        DebitOutcome::UserNotFound => {
            return Err(AppError::NotFound("User not found".into()));
        }
    };

    let page = Page {
        id: EntityType::Page.gen_id(),
        owner_id: owner_id.to_string(),
        title: input.title.clone(),
        slug: input.slug.clone(),
        color: input.color.clone(),
        image: input.image.clone(),
        description: input.description.clone(),
        created_at: now(),
    };

    let inserted = tx.execute(
        "INSERT OR IGNORE INTO pages (id, owner_id, title, slug, color, image, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            page.id,
            page.owner_id,
            page.title,
            page.slug,
            page.color,
            page.image,
            page.description,
            page.created_at
        ],
    )?;
    if inserted == 0 {
        // Lost the constraint race; dropping the transaction reverts the debit.
        return Ok(PageCreation::SlugTaken);
    }

    tx.commit()?;
    Ok(PageCreation::Created { page, balance })
}

pub fn list_pages_by_owner(conn: &Connection, owner_id: &str) -> Result<Vec<Page>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM pages WHERE owner_id = ?1 ORDER BY created_at DESC",
            PAGE_COLS
        ),
        &[&owner_id],
    )
}

/// Public page fetch: capability token + slug, matching how page URLs
/// are addressed.
pub fn get_page_by_token_and_slug(
    conn: &Connection,
    public_token: &str,
    slug: &str,
) -> Result<Option<Page>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM pages p JOIN users u ON u.id = p.owner_id
             WHERE u.public_token = ?1 AND p.slug = ?2",
            PAGE_COLS_QUALIFIED
        ),
        &[&public_token, &slug],
    )
}
