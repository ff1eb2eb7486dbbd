//! Inbound message routing.
//!
//! Turns a raw `(topic, payload)` pair from the broker into a typed
//! [`InboundMessage`]. The first topic segment selects the category, the
//! second carries the session id.

use crate::messages::{decode, AckMessage, PaymentRequestEnvelope};
use crate::topics;
use crate::{MantaError, Result};

/// A decoded broker message addressed to this wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundMessage {
    /// A signed payment request on `payment_requests/{session_id}`.
    PaymentRequest {
        session_id: String,
        envelope: PaymentRequestEnvelope,
    },
    /// A merchant ack on `acks/{session_id}`.
    Ack { session_id: String, ack: AckMessage },
}

impl InboundMessage {
    pub fn session_id(&self) -> &str {
        match self {
            Self::PaymentRequest { session_id, .. } | Self::Ack { session_id, .. } => session_id,
        }
    }
}

/// Classify and decode an inbound message.
///
/// # Errors
///
/// - [`MantaError::UnknownTopic`] for any category other than
///   `payment_requests` or `acks`, or when the session segment is missing.
/// - [`MantaError::Decode`] when the payload is not the JSON the category
///   calls for.
pub fn route(topic: &str, payload: &[u8]) -> Result<InboundMessage> {
    let mut segments = topic.split('/');
    let category = segments.next().unwrap_or_default();
    let session_id = match segments.next() {
        Some(session_id) if !session_id.is_empty() => session_id.to_string(),
        _ => return Err(MantaError::UnknownTopic(topic.to_string())),
    };

    match category {
        topics::PAYMENT_REQUESTS => Ok(InboundMessage::PaymentRequest {
            session_id,
            envelope: decode(payload)?,
        }),
        topics::ACKS => Ok(InboundMessage::Ack {
            session_id,
            ack: decode(payload)?,
        }),
        _ => Err(MantaError::UnknownTopic(topic.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::AckStatus;

    #[test]
    fn test_routes_payment_request() {
        let payload = br#"{"message": "{}", "signature": "c2ln"}"#;
        let routed = route("payment_requests/S1", payload).unwrap();
        assert_eq!(
            routed,
            InboundMessage::PaymentRequest {
                session_id: "S1".into(),
                envelope: PaymentRequestEnvelope::new("{}", "c2ln"),
            }
        );
        assert_eq!(routed.session_id(), "S1");
    }

    #[test]
    fn test_routes_ack() {
        let payload = br#"{"txid": "0", "status": "paid", "transaction_hash": "abc"}"#;
        match route("acks/S1", payload).unwrap() {
            InboundMessage::Ack { session_id, ack } => {
                assert_eq!(session_id, "S1");
                assert_eq!(ack.status, AckStatus::Paid);
                assert_eq!(ack.transaction_hash.as_deref(), Some("abc"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_topics() {
        for topic in ["unknown/topic", "payments/S1", "payment_requests", "acks/", ""] {
            assert!(
                matches!(route(topic, b"{}"), Err(MantaError::UnknownTopic(_))),
                "topic {:?}",
                topic
            );
        }
    }

    #[test]
    fn test_bad_payload_is_decode_error() {
        assert!(matches!(
            route("payment_requests/S1", b"not json"),
            Err(MantaError::Decode(_))
        ));
        assert!(matches!(
            route("acks/S1", br#"{"txid": "0", "status": "lost"}"#),
            Err(MantaError::Decode(_))
        ));
    }
}
