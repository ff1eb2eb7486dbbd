//! Envelope verification against the OpenSSL-generated fixture chain.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use manta_wallet::test_utils::fixtures::{
    signed_envelope, CA_CERT_PEM, MERCHANT_CERT_PEM, UNTRUSTED_CA_PEM,
};
use manta_wallet::PaymentRequestEnvelope;

#[test]
fn test_valid_envelope_verifies() {
    assert!(signed_envelope().verify(MERCHANT_CERT_PEM, CA_CERT_PEM));
}

#[test]
fn test_unpacked_fixture_matches_signed_json() {
    let request = signed_envelope().unpack().unwrap();
    assert_eq!(request.fiat_currency, "EUR");
    assert_eq!(request.merchant.name, "Merchant 1");
    assert!(request.supports("BTC-LN-TESTNET"));
    assert_eq!(
        request.destination_for("BTC").unwrap().destination_address,
        "tb1q3k9kpm5fj7c0kwe2slvx4qkqzk8mjfdlxqejh9"
    );
}

#[test]
fn test_tampered_signature_fails() {
    let envelope = signed_envelope();
    let mut signature = BASE64.decode(&envelope.signature).unwrap();
    signature[10] ^= 0x01;
    let tampered = PaymentRequestEnvelope::new(envelope.message, BASE64.encode(signature));
    assert!(!tampered.verify(MERCHANT_CERT_PEM, CA_CERT_PEM));
}

#[test]
fn test_tampered_message_fails() {
    let envelope = signed_envelope();
    let message = envelope.message.replace("10.5", "10.4");
    assert_ne!(message, envelope.message);
    let tampered = PaymentRequestEnvelope::new(message, envelope.signature);
    assert!(!tampered.verify(MERCHANT_CERT_PEM, CA_CERT_PEM));
}

#[test]
fn test_trailing_whitespace_in_message_fails() {
    let envelope = signed_envelope();
    let tampered = PaymentRequestEnvelope::new(format!("{}\n", envelope.message), envelope.signature);
    assert!(!tampered.verify(MERCHANT_CERT_PEM, CA_CERT_PEM));
}

#[test]
fn test_untrusted_ca_fails() {
    assert!(!signed_envelope().verify(MERCHANT_CERT_PEM, UNTRUSTED_CA_PEM));
}

#[test]
fn test_ca_is_not_a_merchant_certificate() {
    assert!(!signed_envelope().verify(CA_CERT_PEM, CA_CERT_PEM));
}

#[test]
fn test_malformed_inputs_fail_without_panicking() {
    let envelope = signed_envelope();
    assert!(!envelope.verify("", CA_CERT_PEM));
    assert!(!envelope.verify(MERCHANT_CERT_PEM, ""));
    assert!(!envelope.verify("-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----", CA_CERT_PEM));

    let no_signature = PaymentRequestEnvelope::new(envelope.message.clone(), "");
    assert!(!no_signature.verify(MERCHANT_CERT_PEM, CA_CERT_PEM));

    let not_base64 = PaymentRequestEnvelope::new(envelope.message, "***");
    assert!(!not_base64.verify(MERCHANT_CERT_PEM, CA_CERT_PEM));
}
