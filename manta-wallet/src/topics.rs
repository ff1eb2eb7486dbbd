//! Broker topic names for a Manta session.
//!
//! These functions produce the exact topic strings used on the broker. The
//! merchant side subscribes and publishes on the mirror image of these
//! topics, so both ends must agree on them byte for byte.

/// Topic category carrying signed payment request envelopes.
pub const PAYMENT_REQUESTS: &str = "payment_requests";

/// Topic category carrying merchant acknowledgements.
pub const ACKS: &str = "acks";

/// Topic category the wallet publishes payments on.
pub const PAYMENTS: &str = "payments";

/// Crypto currency wildcard: ask the merchant for every supported currency.
pub const ALL_CRYPTOS: &str = "all";

/// Topic the wallet subscribes to for payment request envelopes.
///
/// Format: `payment_requests/{session_id}`
pub fn payment_requests(session_id: &str) -> String {
    format!("{}/{}", PAYMENT_REQUESTS, session_id)
}

/// Topic the wallet publishes an empty message on to ask for a payment request.
///
/// Format: `payment_requests/{session_id}/{crypto_currency}`
///
/// # Example
///
/// ```
/// use manta_wallet::topics;
///
/// assert_eq!(
///     topics::payment_request_for("abc123", "BTC"),
///     "payment_requests/abc123/BTC"
/// );
/// ```
pub fn payment_request_for(session_id: &str, crypto_currency: &str) -> String {
    format!("{}/{}/{}", PAYMENT_REQUESTS, session_id, crypto_currency)
}

/// Topic the wallet subscribes to for merchant acknowledgements.
///
/// Format: `acks/{session_id}`
pub fn acks(session_id: &str) -> String {
    format!("{}/{}", ACKS, session_id)
}

/// Topic the wallet publishes its payment message on.
///
/// Format: `payments/{session_id}`
pub fn payments(session_id: &str) -> String {
    format!("{}/{}", PAYMENTS, session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_formats() {
        assert_eq!(payment_requests("s1"), "payment_requests/s1");
        assert_eq!(payment_request_for("s1", ALL_CRYPTOS), "payment_requests/s1/all");
        assert_eq!(acks("s1"), "acks/s1");
        assert_eq!(payments("s1"), "payments/s1");
    }
}
