mod page;
mod payment_event;
mod processed_transaction;
mod user;

pub use page::{CreatePage, Page};
pub use payment_event::{EventKind, PaymentEvent, Provider};
pub use processed_transaction::ProcessedTransaction;
pub use user::{validate_email_format, CreateUser, User};
