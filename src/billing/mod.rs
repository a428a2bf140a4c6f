pub mod reconcile;
pub mod rules;

pub use reconcile::{reconcile, ReconcileOutcome};
pub use rules::CreditRuleTable;
