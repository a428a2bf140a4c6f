//! Test utilities and fixtures for Pagelure integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub use pagelure::billing::{reconcile, CreditRuleTable, ReconcileOutcome};
pub use pagelure::db::{init_db, queries, AppState};
pub use pagelure::handlers;
pub use pagelure::ledger;
pub use pagelure::models::*;
pub use pagelure::payments::{CardProcessorClient, CheckoutPlatformClient, NormalizedEvent};

pub const CARD_TEST_SECRET: &str = "cp_test_secret";
pub const CHECKOUT_TEST_SECRET: &str = "checkout_test_secret";

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create a test user with an empty balance
pub fn create_test_user(conn: &Connection, email: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        name: format!("Test User {}", email),
    };
    queries::create_user(conn, &input).expect("Failed to create test user")
}

/// Create a test user and credit a starting balance
pub fn create_test_user_with_credits(conn: &Connection, email: &str, credits: i64) -> User {
    let user = create_test_user(conn, email);
    ledger::credit(conn, &user.id, credits).expect("Failed to credit test user");
    User { credits, ..user }
}

/// Create an AppState for testing with an in-memory database
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(4).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        card_processor: CardProcessorClient::new(CARD_TEST_SECRET),
        checkout_platform: CheckoutPlatformClient::new(CHECKOUT_TEST_SECRET),
        rules: Arc::new(CreditRuleTable::default_tariff()),
        page_cost: 180,
    }
}

/// Create a Router with all endpoints wired against the given state
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::api_router())
        .merge(handlers::webhooks::router())
        .with_state(state)
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

// ============ Signed payload builders ============

/// Compute a card processor signature header for a payload
pub fn card_signature_header(payload: &[u8], secret: &str, timestamp: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

/// Compute a checkout platform signature header for a payload
pub fn checkout_signature_header(payload: &[u8], secret: &str) -> String {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Build a card processor charge event body
pub fn card_charge_body(event_type: &str, charge_id: &str, amount: i64, email: &str) -> Vec<u8> {
    serde_json::json!({
        "type": event_type,
        "data": {
            "object": {
                "id": charge_id,
                "amount": amount,
                "created": now(),
                "billing_details": { "email": email }
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// Build a checkout platform order event body
pub fn checkout_order_body(
    event_name: &str,
    transaction_id: &str,
    status: &str,
    total: f64,
    email: &str,
) -> Vec<u8> {
    serde_json::json!({
        "meta": { "event_name": event_name },
        "data": {
            "id": transaction_id,
            "attributes": {
                "status": status,
                "user_email": email,
                "total": total,
                "created_at": now()
            }
        }
    })
    .to_string()
    .into_bytes()
}

/// A normalized card processor payment event for direct reconciliation tests
pub fn card_payment_event(transaction_id: &str, amount: i64, email: &str) -> PaymentEvent {
    PaymentEvent {
        provider: Provider::CardProcessor,
        external_transaction_id: transaction_id.to_string(),
        payer_email: email.to_string(),
        amount_minor: amount,
        occurred_at: now(),
        kind: EventKind::Succeeded,
    }
}
