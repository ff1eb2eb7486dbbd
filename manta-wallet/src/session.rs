//! Session identity: where the broker is and who this client is.

use crate::address::MantaAddress;
use crate::config::WalletConfig;
use crate::topics;
use crate::transport::ConnectOptions;
use crate::Result;
use std::time::Duration;

/// One merchant-initiated exchange.
///
/// Built once from the session URL when the engine is constructed and never
/// changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    address: MantaAddress,
    client_id: String,
}

impl Session {
    /// Create a session for an already parsed address.
    pub fn new(address: MantaAddress, client_id: impl Into<String>) -> Self {
        Self {
            address,
            client_id: client_id.into(),
        }
    }

    /// Parse `url` and pick the client id from `config`, generating a random
    /// one when none is configured.
    pub fn from_url(url: &str, config: &WalletConfig) -> Result<Self> {
        let address = MantaAddress::parse(url)?;
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Ok(Self::new(address, client_id))
    }

    pub fn address(&self) -> &MantaAddress {
        &self.address
    }

    pub fn host(&self) -> &str {
        &self.address.host
    }

    pub fn port(&self) -> u16 {
        self.address.port
    }

    pub fn session_id(&self) -> &str {
        &self.address.session_id
    }

    /// Identifier distinguishing this client to the broker.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn payment_requests_topic(&self) -> String {
        topics::payment_requests(self.session_id())
    }

    pub fn payment_request_topic(&self, crypto_currency: &str) -> String {
        topics::payment_request_for(self.session_id(), crypto_currency)
    }

    pub fn acks_topic(&self) -> String {
        topics::acks(self.session_id())
    }

    pub fn payments_topic(&self) -> String {
        topics::payments(self.session_id())
    }

    /// Connection parameters handed to the transport.
    pub fn connect_options(&self, config: &WalletConfig) -> ConnectOptions {
        ConnectOptions {
            host: self.host().to_string(),
            port: self.port(),
            client_id: self.client_id.clone(),
            auto_reconnect: config.auto_reconnect,
            keep_alive: Duration::from_secs(config.keep_alive_secs),
        }
    }
}
