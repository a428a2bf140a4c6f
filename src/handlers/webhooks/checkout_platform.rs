use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use crate::db::AppState;
use crate::models::Provider;
use crate::payments::{checkout_platform, CheckoutPlatformClient, NormalizedEvent};

use super::common::{handle_webhook, WebhookProvider, WebhookResult};

/// Checkout platform webhook provider implementation.
pub struct CheckoutPlatformWebhook {
    client: CheckoutPlatformClient,
}

impl WebhookProvider for CheckoutPlatformWebhook {
    fn provider(&self) -> Provider {
        Provider::CheckoutPlatform
    }

    fn extract_signature(&self, headers: &HeaderMap) -> Result<String, WebhookResult> {
        headers
            .get(checkout_platform::SIGNATURE_HEADER)
            .ok_or((StatusCode::BAD_REQUEST, "Missing signature header"))?
            .to_str()
            .map(|s| s.to_string())
            .map_err(|e| {
                tracing::debug!("Invalid UTF-8 in checkout signature header: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid signature header")
            })
    }

    fn verify_signature(&self, body: &Bytes, signature: &str) -> Result<bool, WebhookResult> {
        self.client
            .verify_webhook_signature(body, signature)
            .map_err(|e| {
                tracing::error!("Signature verification error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Signature verification failed",
                )
            })
    }

    fn parse_event(&self, body: &Bytes) -> crate::error::Result<NormalizedEvent> {
        self.client.normalize(body)
    }
}

/// Axum handler for checkout platform webhooks.
pub async fn handle_checkout_platform_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let provider = CheckoutPlatformWebhook {
        client: state.checkout_platform.clone(),
    };
    handle_webhook(&provider, &state, headers, body).await
}
