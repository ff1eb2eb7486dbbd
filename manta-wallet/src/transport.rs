//! Broker transport seam.
//!
//! The engine never talks to the network itself. A [`Transport`] wraps an
//! MQTT-style publish/subscribe client; the engine drives it through plain
//! method calls and learns about broker activity through the
//! [`TransportEvents`] handler registered with
//! [`Transport::set_event_handler`].
//!
//! Implementations must deliver events from their own execution context
//! (network task, callback thread), never from inside one of the `Transport`
//! methods. The engine may hold its state lock while calling into the
//! transport.

use crate::Result;
use std::sync::Weak;
use std::time::Duration;

/// Identifier the transport assigns to a published packet. The broker echoes
/// it back in the publish acknowledgement.
pub type PacketId = u16;

/// Parameters for [`Transport::connect`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    /// Reconnect on the transport's own initiative after an unexpected drop.
    pub auto_reconnect: bool,
    pub keep_alive: Duration,
}

impl ConnectOptions {
    /// `host:port` as a socket address string.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Events a transport reports back to the engine.
pub trait TransportEvents: Send + Sync {
    /// The broker accepted the connection.
    fn on_connected(&self);

    /// The broker acknowledged the publish that returned `packet_id`.
    fn on_publish_ack(&self, packet_id: PacketId);

    /// A message arrived on a subscribed topic.
    fn on_message(&self, topic: &str, payload: &[u8]);

    /// The connection was lost or closed. `reason` is `None` for a clean
    /// disconnect.
    fn on_disconnected(&self, reason: Option<&str>);
}

/// Publish/subscribe broker client.
///
/// Every method returns as soon as the request is handed to the client; the
/// outcome arrives later through [`TransportEvents`]. An `Err` means the
/// request could not even be issued.
pub trait Transport: Send + Sync {
    /// Register the handler that receives this transport's events.
    fn set_event_handler(&self, handler: Weak<dyn TransportEvents>);

    /// Begin connecting to the broker.
    fn connect(&self, options: &ConnectOptions) -> Result<()>;

    /// Subscribe to `topic`.
    fn subscribe(&self, topic: &str) -> Result<()>;

    /// Publish `payload` on `topic`, returning the packet id the broker will
    /// acknowledge.
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<PacketId>;

    /// Close the connection. Must be safe to call when not connected.
    fn disconnect(&self);
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn set_event_handler(&self, handler: Weak<dyn TransportEvents>) {
        (**self).set_event_handler(handler)
    }

    fn connect(&self, options: &ConnectOptions) -> Result<()> {
        (**self).connect(options)
    }

    fn subscribe(&self, topic: &str) -> Result<()> {
        (**self).subscribe(topic)
    }

    fn publish(&self, topic: &str, payload: &[u8]) -> Result<PacketId> {
        (**self).publish(topic, payload)
    }

    fn disconnect(&self) {
        (**self).disconnect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority() {
        let options = ConnectOptions {
            host: "broker.local".into(),
            port: 1883,
            client_id: "c".into(),
            auto_reconnect: true,
            keep_alive: Duration::from_secs(60),
        };
        assert_eq!(options.authority(), "broker.local:1883");
    }
}
