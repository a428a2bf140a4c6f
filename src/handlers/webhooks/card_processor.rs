use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use crate::db::AppState;
use crate::error::AppError;
use crate::models::Provider;
use crate::payments::{card_processor, CardProcessorClient, NormalizedEvent};

use super::common::{handle_webhook, WebhookProvider, WebhookResult};

/// Card processor webhook provider implementation.
pub struct CardProcessorWebhook {
    client: CardProcessorClient,
}

impl WebhookProvider for CardProcessorWebhook {
    fn provider(&self) -> Provider {
        Provider::CardProcessor
    }

    fn extract_signature(&self, headers: &HeaderMap) -> Result<String, WebhookResult> {
        headers
            .get(card_processor::SIGNATURE_HEADER)
            .ok_or((StatusCode::BAD_REQUEST, "Missing signature header"))?
            .to_str()
            .map(|s| s.to_string())
            .map_err(|e| {
                tracing::debug!("Invalid UTF-8 in card processor signature header: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid signature header")
            })
    }

    fn verify_signature(&self, body: &Bytes, signature: &str) -> Result<bool, WebhookResult> {
        self.client
            .verify_webhook_signature(body, signature)
            .map_err(|e| match e {
                // Unparseable signature headers are verification failures,
                // same as a mismatched digest.
                AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Invalid signature format"),
                e => {
                    tracing::error!("Signature verification error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Signature verification failed",
                    )
                }
            })
    }

    fn parse_event(&self, body: &Bytes) -> crate::error::Result<NormalizedEvent> {
        self.client.normalize(body)
    }
}

/// Axum handler for card processor webhooks.
pub async fn handle_card_processor_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let provider = CardProcessorWebhook {
        client: state.card_processor.clone(),
    };
    handle_webhook(&provider, &state, headers, body).await
}
