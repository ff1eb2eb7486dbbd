//! Manta protocol messages and their JSON codec.
//!
//! Field names on the wire are snake_case. Amounts are decimal strings, see
//! [`crate::amount`].

use crate::amount;
use crate::{MantaError, Result};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Serialize a message to a JSON string.
///
/// Failures surface as [`MantaError::Encoding`].
pub fn encode<T: Serialize>(message: &T) -> Result<String> {
    serde_json::to_string(message).map_err(|e| MantaError::Encoding(e.to_string()))
}

/// Decode a message from raw JSON bytes.
///
/// Failures surface as [`MantaError::Decode`].
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| MantaError::Decode(e.to_string()))
}

/// A signed container for a [`PaymentRequestMessage`].
///
/// `message` is the JSON text exactly as the merchant signed it. It is kept
/// as an opaque string so signature checks run over the signed bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequestEnvelope {
    /// Raw JSON of the payment request.
    pub message: String,
    /// Base64 RSA PKCS#1 v1.5 SHA-256 signature over `message`.
    pub signature: String,
}

impl PaymentRequestEnvelope {
    pub fn new(message: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            signature: signature.into(),
        }
    }

    /// Decode the wrapped payment request.
    pub fn unpack(&self) -> Result<PaymentRequestMessage> {
        decode(self.message.as_bytes())
    }

    /// Check the envelope signature against the merchant certificate, which
    /// must chain up to `ca_pem`. Every failure collapses to `false`.
    pub fn verify(&self, merchant_pem: &str, ca_pem: &str) -> bool {
        crate::verify::verify_envelope(self, merchant_pem, ca_pem)
    }
}

/// What the merchant wants to be paid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequestMessage {
    /// Total in fiat.
    #[serde(with = "amount::as_string")]
    pub amount: Decimal,
    /// Fiat currency code (e.g., "EUR").
    pub fiat_currency: String,
    /// Where to pay, one entry per crypto currency.
    pub destinations: Vec<Destination>,
    pub merchant: Merchant,
    /// Crypto currencies the merchant accepts.
    pub supported_cryptos: BTreeSet<String>,
}

impl PaymentRequestMessage {
    /// First destination for `crypto_currency`, if the merchant offered one.
    pub fn destination_for(&self, crypto_currency: &str) -> Option<&Destination> {
        self.destinations
            .iter()
            .find(|d| d.crypto_currency == crypto_currency)
    }

    /// Whether the merchant accepts `crypto_currency`.
    pub fn supports(&self, crypto_currency: &str) -> bool {
        self.supported_cryptos.contains(crypto_currency)
    }
}

/// A single payment destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Amount in `crypto_currency`.
    #[serde(with = "amount::as_string")]
    pub amount: Decimal,
    pub crypto_currency: String,
    /// Address, invoice or other currency-specific payment target.
    pub destination_address: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Merchant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Merchant-side status of a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    /// Session created, nothing received yet.
    New,
    /// Payment seen, waiting for confirmation.
    Pending,
    /// Payment confirmed.
    Paid,
}

impl AckStatus {
    /// Whether no further acks are expected for this payment.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Paid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

/// Protocol-level acknowledgement sent by the merchant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    pub txid: String,
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        with = "amount::option_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

/// Payment notification the wallet sends to the merchant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMessage {
    pub crypto_currency: String,
    pub transaction_hash: String,
}

impl PaymentMessage {
    pub fn new(crypto_currency: impl Into<String>, transaction_hash: impl Into<String>) -> Self {
        Self {
            crypto_currency: crypto_currency.into(),
            transaction_hash: transaction_hash.into(),
        }
    }
}
