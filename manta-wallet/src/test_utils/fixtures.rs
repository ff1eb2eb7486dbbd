//! Certificate and envelope fixtures.
//!
//! Generated with OpenSSL: an RSA-2048 CA, a merchant certificate signed by
//! it (valid 2020-01-01 to 2099-12-31), an unrelated CA carrying the same
//! subject name, and a payment request signed with the merchant key.

use crate::messages::{encode, PaymentRequestEnvelope};

/// CA certificate the merchant certificate chains to.
pub const CA_CERT_PEM: &str = include_str!("../../tests/fixtures/ca.pem");

/// Merchant certificate signed by [`CA_CERT_PEM`].
pub const MERCHANT_CERT_PEM: &str = include_str!("../../tests/fixtures/merchant.pem");

/// Different key, same subject as [`CA_CERT_PEM`].
pub const UNTRUSTED_CA_PEM: &str = include_str!("../../tests/fixtures/untrusted_ca.pem");

/// The payment request JSON exactly as signed.
pub const PAYMENT_REQUEST_JSON: &str = include_str!("../../tests/fixtures/payment_request.json");

const PAYMENT_REQUEST_SIG: &str = include_str!("../../tests/fixtures/payment_request.sig");

/// Base64 signature over [`PAYMENT_REQUEST_JSON`] by the merchant key.
pub fn payment_request_signature() -> &'static str {
    PAYMENT_REQUEST_SIG.trim()
}

/// Envelope that verifies against [`MERCHANT_CERT_PEM`] and [`CA_CERT_PEM`].
pub fn signed_envelope() -> PaymentRequestEnvelope {
    PaymentRequestEnvelope::new(PAYMENT_REQUEST_JSON, payment_request_signature())
}

/// [`signed_envelope`] as the JSON payload a merchant publishes.
pub fn signed_envelope_payload() -> Vec<u8> {
    encode(&signed_envelope())
        .map(String::into_bytes)
        .unwrap_or_default()
}

/// A merchant ack payload.
pub fn ack_payload(txid: &str, status: &str) -> Vec<u8> {
    serde_json::json!({
        "txid": txid,
        "status": status,
        "transaction_hash": format!("hash-{}", txid),
    })
    .to_string()
    .into_bytes()
}
