pub mod card_processor;
pub mod checkout_platform;
pub mod common;

pub use card_processor::handle_card_processor_webhook;
pub use checkout_platform::handle_checkout_platform_webhook;

use axum::{routing::post, Router};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook/card-processor", post(handle_card_processor_webhook))
        .route(
            "/webhook/checkout-platform",
            post(handle_checkout_platform_webhook),
        )
}
