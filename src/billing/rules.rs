//! Fixed mapping from (provider, paid amount) to a credit grant.
//!
//! This is deployment configuration, not user data: the table is built
//! once at process start and read-only afterwards. Amounts with no entry
//! are deliberately inert - an unexpected or partial payment must never
//! be processed as a full grant.

use std::collections::HashMap;

use crate::models::Provider;

#[derive(Debug, Clone)]
pub struct CreditRuleTable {
    rules: HashMap<(Provider, i64), i64>,
}

impl CreditRuleTable {
    /// Build a table from explicit (provider, amount_minor, credits) rules.
    pub fn from_rules(rules: &[(Provider, i64, i64)]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|&(provider, amount, credits)| ((provider, amount), credits))
                .collect(),
        }
    }

    /// The production tariff.
    pub fn default_tariff() -> Self {
        use Provider::*;
        Self::from_rules(&[
            (CardProcessor, 1000, 500),
            (CardProcessor, 1800, 1000),
            (CheckoutPlatform, 5999, 1000),
            (CheckoutPlatform, 21299, 3000),
            (CheckoutPlatform, 42699, 6000),
            (CheckoutPlatform, 85299, 12000),
        ])
    }

    /// Exact-match lookup. `None` means no rule - log and acknowledge,
    /// never guess a grant.
    pub fn lookup(&self, provider: Provider, amount_minor: i64) -> Option<i64> {
        self.rules.get(&(provider, amount_minor)).copied()
    }
}
