//! Webhook signature verification tests

mod common;

use common::*;

// ============ Card Processor Signature Verification Tests ============

fn card_client() -> CardProcessorClient {
    CardProcessorClient::new(CARD_TEST_SECRET)
}

/// Get current Unix timestamp as a string (for webhook signature tests)
fn current_timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Get an old timestamp (for testing timestamp rejection)
fn old_timestamp() -> String {
    // 10 minutes ago - beyond the 5-minute tolerance
    (chrono::Utc::now().timestamp() - 600).to_string()
}

#[test]
fn test_card_valid_signature() {
    let client = card_client();
    let payload = b"{\"type\":\"charge.succeeded\"}";
    let header = card_signature_header(payload, CARD_TEST_SECRET, &current_timestamp());

    let result = client
        .verify_webhook_signature(payload, &header)
        .expect("Verification should not error");

    assert!(result, "Valid signature should be accepted");
}

#[test]
fn test_card_invalid_signature() {
    let client = card_client();
    let payload = b"{\"type\":\"charge.succeeded\"}";
    // Wrong secret generates an invalid signature
    let header = card_signature_header(payload, "wrong_secret", &current_timestamp());

    let result = client
        .verify_webhook_signature(payload, &header)
        .expect("Verification should not error");

    assert!(!result, "Invalid signature should be rejected");
}

#[test]
fn test_card_modified_payload() {
    let client = card_client();
    let original_payload = b"{\"type\":\"charge.succeeded\"}";
    let modified_payload = b"{\"type\":\"charge.succeeded\",\"hacked\":true}";
    let header = card_signature_header(original_payload, CARD_TEST_SECRET, &current_timestamp());

    let result = client
        .verify_webhook_signature(modified_payload, &header)
        .expect("Verification should not error");

    assert!(!result, "Modified payload should be rejected");
}

#[test]
fn test_card_old_timestamp_rejected() {
    let client = card_client();
    let payload = b"{\"type\":\"charge.succeeded\"}";
    // Valid signature but timestamp too old
    let header = card_signature_header(payload, CARD_TEST_SECRET, &old_timestamp());

    let result = client
        .verify_webhook_signature(payload, &header)
        .expect("Verification should not error");

    assert!(!result, "Old timestamp should be rejected (replay prevention)");
}

#[test]
fn test_card_future_timestamp_rejected() {
    let client = card_client();
    let payload = b"{\"type\":\"charge.succeeded\"}";
    // 5 minutes in the future - beyond the 60s clock skew allowance
    let future = (chrono::Utc::now().timestamp() + 300).to_string();
    let header = card_signature_header(payload, CARD_TEST_SECRET, &future);

    let result = client
        .verify_webhook_signature(payload, &header)
        .expect("Verification should not error");

    assert!(!result, "Future timestamp should be rejected");
}

#[test]
fn test_card_missing_timestamp() {
    let client = card_client();
    let payload = b"{\"type\":\"charge.succeeded\"}";
    let result = client.verify_webhook_signature(payload, "v1=somesignature");

    assert!(result.is_err(), "Missing timestamp should error");
}

#[test]
fn test_card_missing_v1() {
    let client = card_client();
    let payload = b"{\"type\":\"charge.succeeded\"}";
    let header = format!("t={}", current_timestamp());
    let result = client.verify_webhook_signature(payload, &header);

    assert!(result.is_err(), "Missing v1 component should error");
}

#[test]
fn test_card_garbage_timestamp() {
    let client = card_client();
    let payload = b"{\"type\":\"charge.succeeded\"}";
    let result = client.verify_webhook_signature(payload, "t=notanumber,v1=abc");

    assert!(result.is_err(), "Non-numeric timestamp should error");
}

// ============ Checkout Platform Signature Verification Tests ============

fn checkout_client() -> CheckoutPlatformClient {
    CheckoutPlatformClient::new(CHECKOUT_TEST_SECRET)
}

#[test]
fn test_checkout_valid_signature() {
    let client = checkout_client();
    let payload = b"{\"meta\":{\"event_name\":\"order_paid\"}}";
    let header = checkout_signature_header(payload, CHECKOUT_TEST_SECRET);

    let result = client
        .verify_webhook_signature(payload, &header)
        .expect("Verification should not error");

    assert!(result, "Valid signature should be accepted");
}

#[test]
fn test_checkout_invalid_signature() {
    let client = checkout_client();
    let payload = b"{\"meta\":{\"event_name\":\"order_paid\"}}";
    let header = checkout_signature_header(payload, "wrong_secret");

    let result = client
        .verify_webhook_signature(payload, &header)
        .expect("Verification should not error");

    assert!(!result, "Invalid signature should be rejected");
}

#[test]
fn test_checkout_modified_payload() {
    let client = checkout_client();
    let original = b"{\"meta\":{\"event_name\":\"order_paid\"}}";
    let modified = b"{\"meta\":{\"event_name\":\"order_paid\"},\"x\":1}";
    let header = checkout_signature_header(original, CHECKOUT_TEST_SECRET);

    let result = client
        .verify_webhook_signature(modified, &header)
        .expect("Verification should not error");

    assert!(!result, "Modified payload should be rejected");
}

#[test]
fn test_checkout_signature_is_not_hex() {
    let client = checkout_client();
    let payload = b"{\"meta\":{\"event_name\":\"order_paid\"}}";
    // A hex encoding of the correct digest must NOT verify - the platform
    // sends base64.
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(CHECKOUT_TEST_SECRET.as_bytes()).unwrap();
    mac.update(payload);
    let hex_digest = hex::encode(mac.finalize().into_bytes());

    let result = client
        .verify_webhook_signature(payload, &hex_digest)
        .expect("Verification should not error");

    assert!(!result, "Hex-encoded digest should be rejected");
}

// ============ Normalization Tests ============

#[test]
fn test_card_normalize_succeeded_charge() {
    let client = card_client();
    let body = card_charge_body("charge.succeeded", "ch_100", 1000, "a@x.com");

    let event = match client.normalize(&body).expect("normalize should succeed") {
        NormalizedEvent::Payment(e) => e,
        NormalizedEvent::Ignored => panic!("succeeded charge should not be ignored"),
    };

    assert_eq!(event.provider, Provider::CardProcessor);
    assert_eq!(event.external_transaction_id, "ch_100");
    assert_eq!(event.payer_email, "a@x.com");
    assert_eq!(event.amount_minor, 1000);
    assert_eq!(event.kind, EventKind::Succeeded);
}

#[test]
fn test_card_normalize_failed_charge() {
    let client = card_client();
    let body = card_charge_body("charge.failed", "ch_101", 1000, "a@x.com");

    let event = match client.normalize(&body).expect("normalize should succeed") {
        NormalizedEvent::Payment(e) => e,
        NormalizedEvent::Ignored => panic!("failed charge should be normalized, not ignored"),
    };

    assert_eq!(event.kind, EventKind::Failed);
}

#[test]
fn test_card_normalize_unrelated_event_ignored() {
    let client = card_client();
    let body = serde_json::json!({
        "type": "customer.created",
        "data": { "object": { "id": "cus_1" } }
    })
    .to_string()
    .into_bytes();

    assert!(matches!(
        client.normalize(&body).expect("normalize should succeed"),
        NormalizedEvent::Ignored
    ));
}

#[test]
fn test_card_normalize_malformed_payload_errors() {
    let client = card_client();
    assert!(client.normalize(b"not json at all").is_err());
    assert!(client.normalize(b"{\"type\":\"charge.succeeded\"}").is_err());
}

#[test]
fn test_checkout_normalize_order_paid() {
    let client = checkout_client();
    let body = checkout_order_body("order_paid", "77", "paid", 212.99, "a@x.com");

    let event = match client.normalize(&body).expect("normalize should succeed") {
        NormalizedEvent::Payment(e) => e,
        NormalizedEvent::Ignored => panic!("paid order should not be ignored"),
    };

    assert_eq!(event.provider, Provider::CheckoutPlatform);
    assert_eq!(event.external_transaction_id, "77");
    // 212.99 currency units -> 21299 minor units, integer-exact
    assert_eq!(event.amount_minor, 21299);
    assert_eq!(event.kind, EventKind::Succeeded);
}

#[test]
fn test_checkout_normalize_other_events_ignored() {
    let client = checkout_client();

    let created = checkout_order_body("order_created", "78", "pending", 59.99, "a@x.com");
    assert!(matches!(
        client.normalize(&created).expect("normalize should succeed"),
        NormalizedEvent::Ignored
    ));

    // order_paid event whose status is not actually paid
    let unpaid = checkout_order_body("order_paid", "79", "pending", 59.99, "a@x.com");
    assert!(matches!(
        client.normalize(&unpaid).expect("normalize should succeed"),
        NormalizedEvent::Ignored
    ));
}

#[test]
fn test_checkout_normalize_malformed_payload_errors() {
    let client = checkout_client();
    assert!(client.normalize(b"{{{{").is_err());
}
