mod from_row;
pub mod queries;
mod schema;

pub use from_row::FromRow;
pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::billing::CreditRuleTable;
use crate::payments::{CardProcessorClient, CheckoutPlatformClient};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state wired once at process start and passed by reference
/// to every handler - components are constructor-injected, no ambient
/// registry.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Signature verifier + normalizer for the card processor.
    pub card_processor: CardProcessorClient,
    /// Signature verifier + normalizer for the checkout platform.
    pub checkout_platform: CheckoutPlatformClient,
    /// Fixed (provider, amount) -> credits tariff.
    pub rules: Arc<CreditRuleTable>,
    /// Credits debited per page creation.
    pub page_cost: i64,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
