//! In-memory broker transport.

use crate::transport::{ConnectOptions, PacketId, Transport, TransportEvents};
use crate::{MantaError, Result};
use std::sync::{Arc, Mutex, Weak};

/// A packet the engine published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedPacket {
    pub packet_id: PacketId,
    pub topic: String,
    pub payload: Vec<u8>,
}

impl PublishedPacket {
    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or_default()
    }
}

struct MockState {
    handler: Option<Weak<dyn TransportEvents>>,
    connects: Vec<ConnectOptions>,
    subscriptions: Vec<String>,
    published: Vec<PublishedPacket>,
    disconnects: usize,
    next_packet_id: PacketId,
    fixed_packet_id: Option<PacketId>,
    connect_error: Option<String>,
    subscribe_error: Option<String>,
    publish_error: Option<String>,
}

/// Transport double that records every call and lets tests inject events.
///
/// Clones share state, so a test keeps one clone while the engine owns
/// another. Events are delivered synchronously on the calling thread, with
/// the mock's own lock released.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                handler: None,
                connects: Vec::new(),
                subscriptions: Vec::new(),
                published: Vec::new(),
                disconnects: 0,
                next_packet_id: 1,
                fixed_packet_id: None,
                connect_error: None,
                subscribe_error: None,
                publish_error: None,
            })),
        }
    }

    /// Make `connect` fail with `message`, or succeed again with `None`.
    pub fn fail_connect(&self, message: Option<&str>) {
        self.state.lock().unwrap().connect_error = message.map(str::to_string);
    }

    pub fn fail_subscribe(&self, message: Option<&str>) {
        self.state.lock().unwrap().subscribe_error = message.map(str::to_string);
    }

    pub fn fail_publish(&self, message: Option<&str>) {
        self.state.lock().unwrap().publish_error = message.map(str::to_string);
    }

    /// Hand out `packet_id` for every publish instead of counting up.
    pub fn use_packet_id(&self, packet_id: Option<PacketId>) {
        self.state.lock().unwrap().fixed_packet_id = packet_id;
    }

    pub fn connects(&self) -> Vec<ConnectOptions> {
        self.state.lock().unwrap().connects.clone()
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.state.lock().unwrap().subscriptions.clone()
    }

    pub fn published(&self) -> Vec<PublishedPacket> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn last_published(&self) -> Option<PublishedPacket> {
        self.state.lock().unwrap().published.last().cloned()
    }

    pub fn disconnects(&self) -> usize {
        self.state.lock().unwrap().disconnects
    }

    pub fn has_handler(&self) -> bool {
        self.handler().is_some()
    }

    fn handler(&self) -> Option<Arc<dyn TransportEvents>> {
        let state = self.state.lock().unwrap();
        state.handler.as_ref().and_then(Weak::upgrade)
    }

    pub fn deliver_connected(&self) {
        if let Some(handler) = self.handler() {
            handler.on_connected();
        }
    }

    pub fn deliver_publish_ack(&self, packet_id: PacketId) {
        if let Some(handler) = self.handler() {
            handler.on_publish_ack(packet_id);
        }
    }

    pub fn deliver_message(&self, topic: &str, payload: impl AsRef<[u8]>) {
        if let Some(handler) = self.handler() {
            handler.on_message(topic, payload.as_ref());
        }
    }

    pub fn deliver_disconnected(&self, reason: Option<&str>) {
        if let Some(handler) = self.handler() {
            handler.on_disconnected(reason);
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn set_event_handler(&self, handler: Weak<dyn TransportEvents>) {
        self.state.lock().unwrap().handler = Some(handler);
    }

    fn connect(&self, options: &ConnectOptions) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.connect_error {
            return Err(MantaError::Transport(message.clone()));
        }
        state.connects.push(options.clone());
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.subscribe_error {
            return Err(MantaError::Transport(message.clone()));
        }
        state.subscriptions.push(topic.to_string());
        Ok(())
    }

    fn publish(&self, topic: &str, payload: &[u8]) -> Result<PacketId> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.publish_error {
            return Err(MantaError::Transport(message.clone()));
        }
        let packet_id = match state.fixed_packet_id {
            Some(packet_id) => packet_id,
            None => {
                let packet_id = state.next_packet_id;
                state.next_packet_id = state.next_packet_id.checked_add(1).unwrap_or(1);
                packet_id
            }
        };
        state.published.push(PublishedPacket {
            packet_id,
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
        Ok(packet_id)
    }

    fn disconnect(&self) {
        self.state.lock().unwrap().disconnects += 1;
    }
}
