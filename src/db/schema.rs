use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Users (account holders with a prepaid credit balance)
        -- credits is mutated only through the ledger; the CHECK is the
        -- storage-level backstop for the non-negativity invariant.
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            public_token TEXT NOT NULL,
            credits INTEGER NOT NULL DEFAULT 0 CHECK (credits >= 0),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_public_token ON users(public_token);

        -- Trackable pages. Slug collisions are scoped per owner.
        CREATE TABLE IF NOT EXISTS pages (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            color TEXT NOT NULL,
            image TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(owner_id, slug)
        );
        CREATE INDEX IF NOT EXISTS idx_pages_owner ON pages(owner_id);

        -- Processed payment transactions (recharges).
        -- Append-only: one row per reconciled (provider, external id) pair.
        -- The UNIQUE constraint is the idempotency anchor - claims are a
        -- conditional insert against it, never a check-then-insert pair.
        CREATE TABLE IF NOT EXISTS processed_transactions (
            id TEXT PRIMARY KEY,
            provider TEXT NOT NULL CHECK (provider IN ('card_processor', 'checkout_platform')),
            external_transaction_id TEXT NOT NULL,
            payer_email TEXT NOT NULL,
            amount_minor INTEGER NOT NULL,
            credits_granted INTEGER,
            outcome TEXT NOT NULL CHECK (outcome IN ('claimed', 'granted', 'no_rule', 'unknown_payer')),
            occurred_at INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(provider, external_transaction_id)
        );
        CREATE INDEX IF NOT EXISTS idx_processed_tx_lookup
            ON processed_transactions(provider, external_transaction_id);
        CREATE INDEX IF NOT EXISTS idx_processed_tx_email ON processed_transactions(payer_email);
        "#,
    )?;
    Ok(())
}
