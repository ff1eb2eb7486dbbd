//! Test utilities for the wallet engine.
//!
//! - [`MockTransport`]: records transport calls and injects broker events
//! - [`RecordingLogger`]: keeps every log record for assertions
//! - [`fixtures`]: certificates and a signed payment request
//!
//! ## Usage
//!
//! ```rust,ignore
//! use manta_wallet::test_utils::{fixtures, MockTransport};
//! use manta_wallet::MantaWallet;
//!
//! let transport = MockTransport::new();
//! let wallet = MantaWallet::new("manta://localhost/S1", transport.clone())?;
//!
//! let mut request = wallet.get_payment_request("BTC");
//! transport.deliver_connected();
//! transport.deliver_message("payment_requests/S1", fixtures::signed_envelope_payload());
//! assert!(request.try_result().is_some());
//! ```

pub mod fixtures;
mod mock_transport;

pub use mock_transport::{MockTransport, PublishedPacket};

use crate::logging::{LogLevel, LogRecord, Logger};
use std::sync::Mutex;

/// Logger that keeps every record in memory.
#[derive(Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Whether a record at `level` has a message containing `text`.
    pub fn contains(&self, level: LogLevel, text: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.level == level && r.message.contains(text))
    }

    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&self, record: &LogRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}
