//! Manta Wallet Protocol Engine
//!
//! This crate implements the wallet side of the Manta payment protocol. A
//! merchant publishes a session as a `manta://<host>[:<port>]/<session_id>` URL;
//! the wallet connects to that broker, asks for a signed payment request,
//! checks the request against the merchant certificate chain and finally
//! reports the payment back on the same session.
//!
//! The broker client is injected through the [`Transport`] trait, so the
//! engine itself performs no network I/O.
//!
//! # Example
//!
//! ```ignore
//! use manta_wallet::{MantaWallet, topics::ALL_CRYPTOS};
//!
//! let wallet = MantaWallet::new("manta://broker.example.com/abc123", transport)?;
//!
//! let envelope = wallet.get_payment_request("BTC").await?;
//! if envelope.verify(&merchant_pem, &ca_pem) {
//!     let request = envelope.unpack()?;
//!     // ... pay request.destination_for("BTC") ...
//!     wallet.send_payment("BTC", &tx_hash)?.await?;
//!     let ack = wallet.next_ack().await?;
//! }
//! ```

use std::time::Duration;

pub mod address;
pub mod amount;
pub mod config;
pub mod logging;
pub mod messages;
pub mod pending;
pub mod queue;
pub mod router;
pub mod session;
pub mod topics;
pub mod transport;
pub mod verify;
pub mod wallet;

/// Test utilities: mock transport, recording logger and certificate fixtures.
///
/// Only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use address::{MantaAddress, DEFAULT_PORT};
pub use config::WalletConfig;
pub use logging::{FanoutLogger, LogLevel, LogRecord, Logger, LogstashLogger, TracingLogger};
pub use messages::{
    AckMessage, AckStatus, Destination, Merchant, PaymentMessage, PaymentRequestEnvelope,
    PaymentRequestMessage,
};
pub use pending::Pending;
pub use queue::AsyncQueue;
pub use session::Session;
pub use transport::{ConnectOptions, PacketId, Transport, TransportEvents};
pub use wallet::{ConnectionState, MantaWallet};

/// Result type for wallet operations.
pub type Result<T> = std::result::Result<T, MantaError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MantaError {
    #[error("invalid manta address: {0}")]
    InvalidAddress(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("no route for topic: {0}")]
    UnknownTopic(String),
    #[error("a payment request is already in flight for this session")]
    RequestInFlight,
    #[error("operation abandoned before completion")]
    Abandoned,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
