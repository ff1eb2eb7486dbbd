//! Configuration for the wallet engine.

use serde::{Deserialize, Serialize};

/// Engine configuration.
///
/// Every field has a default, so a partial JSON document deserializes into a
/// usable config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Fixed client id presented to the broker. A random UUID is generated
    /// per engine when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Ask the transport to reconnect on its own after a drop.
    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,

    /// Broker keep-alive interval in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Maximum number of unconsumed merchant acks kept in memory. The oldest
    /// ack is evicted when the limit is hit. `None` keeps every ack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_buffer_limit: Option<usize>,
}

fn default_auto_reconnect() -> bool {
    true
}

fn default_keep_alive_secs() -> u64 {
    60
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            auto_reconnect: default_auto_reconnect(),
            keep_alive_secs: default_keep_alive_secs(),
            ack_buffer_limit: None,
        }
    }
}

impl WalletConfig {
    /// Use a fixed client id instead of a random one.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Enable or disable transport auto-reconnect.
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Set the broker keep-alive interval.
    pub fn with_keep_alive_secs(mut self, secs: u64) -> Self {
        self.keep_alive_secs = secs;
        self
    }

    /// Bound the number of buffered merchant acks.
    pub fn with_ack_buffer_limit(mut self, limit: usize) -> Self {
        self.ack_buffer_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: WalletConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WalletConfig::default());
        assert!(config.auto_reconnect);
        assert_eq!(config.keep_alive_secs, 60);
        assert!(config.client_id.is_none());
        assert!(config.ack_buffer_limit.is_none());
    }

    #[test]
    fn test_partial_json() {
        let config: WalletConfig =
            serde_json::from_str(r#"{"client_id": "w1", "ack_buffer_limit": 16}"#).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("w1"));
        assert_eq!(config.ack_buffer_limit, Some(16));
        assert!(config.auto_reconnect);
    }
}
