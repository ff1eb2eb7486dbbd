use manta_wallet::messages::{decode, encode};
use manta_wallet::{
    AckMessage, AckStatus, Destination, Merchant, PaymentMessage, PaymentRequestEnvelope,
    PaymentRequestMessage,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

#[test]
fn test_amount_survives_round_trip_as_string() {
    let destination = Destination {
        amount: dec!(1.50),
        crypto_currency: "BTC".to_string(),
        destination_address: "tb1qaddr".to_string(),
    };

    let serialized = encode(&destination).unwrap();
    let value: serde_json::Value = serde_json::from_str(&serialized).unwrap();
    assert_eq!(value["amount"], json!("1.50"));

    let back: Destination = decode(serialized.as_bytes()).unwrap();
    assert_eq!(back.amount, dec!(1.50));
    assert_eq!(back.amount.to_string(), "1.50");
}

#[test]
fn test_invalid_amount_decodes_to_zero() {
    let payload = json!({
        "amount": "abc",
        "crypto_currency": "BTC",
        "destination_address": "tb1qaddr"
    });
    let destination: Destination = decode(payload.to_string().as_bytes()).unwrap();
    assert_eq!(destination.amount, Decimal::ZERO);
}

#[test]
fn test_numeric_ack_amount_is_accepted() {
    let ack: AckMessage =
        decode(br#"{"txid": "1", "status": "paid", "amount": 0.0001, "url": "https://x"}"#)
            .unwrap();
    assert_eq!(ack.amount, Some(dec!(0.0001)));
    assert_eq!(ack.url.as_deref(), Some("https://x"));
    assert_eq!(ack.transaction_hash, None);
}

#[test]
fn test_ack_wire_format() {
    let ack = AckMessage {
        txid: "42".into(),
        status: AckStatus::Pending,
        url: None,
        amount: Some(dec!(0.02)),
        transaction_hash: Some("beef".into()),
    };
    let value: serde_json::Value = serde_json::from_str(&encode(&ack).unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"txid": "42", "status": "pending", "amount": "0.02", "transaction_hash": "beef"})
    );
}

#[test]
fn test_envelope_message_is_kept_verbatim() {
    let inner = r#"{"amount":  "5", "fiat_currency": "EUR"}"#;
    let envelope = PaymentRequestEnvelope::new(inner, "c2ln");
    let payload = encode(&envelope).unwrap();
    let back: PaymentRequestEnvelope = decode(payload.as_bytes()).unwrap();
    assert_eq!(back.message, inner);
}

#[test]
fn test_unpack_envelope() {
    let request = PaymentRequestMessage {
        amount: dec!(10.5),
        fiat_currency: "EUR".into(),
        destinations: vec![Destination {
            amount: dec!(0.001234),
            crypto_currency: "BTC".into(),
            destination_address: "tb1qaddr".into(),
        }],
        merchant: Merchant {
            name: "Merchant 1".into(),
            address: None,
        },
        supported_cryptos: ["BTC".to_string()].into_iter().collect(),
    };
    let envelope = PaymentRequestEnvelope::new(encode(&request).unwrap(), "sig");
    assert_eq!(envelope.unpack().unwrap(), request);

    let broken = PaymentRequestEnvelope::new("{not json", "sig");
    assert!(matches!(
        broken.unpack(),
        Err(manta_wallet::MantaError::Decode(_))
    ));
}

#[test]
fn test_payment_message_fields() {
    let value: serde_json::Value =
        serde_json::from_str(&encode(&PaymentMessage::new("ETH", "0xabc")).unwrap()).unwrap();
    assert_eq!(value, json!({"crypto_currency": "ETH", "transaction_hash": "0xabc"}));
}
