//! The wallet-side protocol engine.
//!
//! [`MantaWallet`] owns one session and drives the broker transport: it
//! connects, asks the merchant for a payment request, reports payments and
//! collects merchant acks. Every operation that waits on the broker returns a
//! [`Pending`] that transport events resolve later.
//!
//! # Locking
//!
//! All mutable engine state lives behind a single mutex. Completers are
//! always taken out of the state and resolved after the lock is released.
//! The lock is held across [`Transport::publish`] so a publish ack can never
//! be processed before its packet id is registered.

use crate::config::WalletConfig;
use crate::logging::{LogLevel, LogRecord, Logger, TracingLogger};
use crate::messages::{encode, AckMessage, PaymentMessage, PaymentRequestEnvelope};
use crate::pending::{pending, Completer, Pending};
use crate::queue::AsyncQueue;
use crate::router::{route, InboundMessage};
use crate::session::Session;
use crate::transport::{PacketId, Transport, TransportEvents};
use crate::{MantaError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Broker connection state as seen by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug)]
struct EngineState {
    connection: ConnectionState,
    connect_waiters: Vec<Completer<()>>,
    payment_request: Option<Completer<PaymentRequestEnvelope>>,
    /// Crypto currency of a payment request waiting for the connection.
    deferred_request: Option<String>,
    last_envelope: Option<PaymentRequestEnvelope>,
    publish_acks: HashMap<PacketId, Completer<()>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            connect_waiters: Vec::new(),
            payment_request: None,
            deferred_request: None,
            last_envelope: None,
            publish_acks: HashMap::new(),
        }
    }

    fn request_in_flight(&self) -> bool {
        self.payment_request
            .as_ref()
            .is_some_and(|slot| !slot.is_abandoned())
    }
}

struct WalletInner<T: Transport> {
    transport: T,
    session: Session,
    config: WalletConfig,
    logger: Arc<dyn Logger>,
    state: Mutex<EngineState>,
    acks: AsyncQueue<AckMessage>,
}

/// Wallet side of one Manta payment session.
///
/// Dropping the wallet disconnects the transport.
pub struct MantaWallet<T: Transport + 'static> {
    inner: Arc<WalletInner<T>>,
}

impl<T: Transport + 'static> MantaWallet<T> {
    /// Create a wallet for the session `url` with default configuration,
    /// logging through `tracing`.
    ///
    /// # Errors
    ///
    /// [`MantaError::InvalidAddress`] when `url` is not a `manta://` address.
    pub fn new(url: &str, transport: T) -> Result<Self> {
        Self::with_config(url, transport, WalletConfig::default())
    }

    pub fn with_config(url: &str, transport: T, config: WalletConfig) -> Result<Self> {
        Self::with_logger(url, transport, config, Arc::new(TracingLogger))
    }

    /// Create a wallet that logs through `logger`.
    pub fn with_logger(
        url: &str,
        transport: T,
        config: WalletConfig,
        logger: Arc<dyn Logger>,
    ) -> Result<Self> {
        let session = Session::from_url(url, &config)?;
        let inner = Arc::new(WalletInner {
            transport,
            session,
            acks: AsyncQueue::with_capacity_limit(config.ack_buffer_limit),
            config,
            logger,
            state: Mutex::new(EngineState::new()),
        });

        let weak: Weak<WalletInner<T>> = Arc::downgrade(&inner);
        let handler: Weak<dyn TransportEvents> = weak;
        inner.transport.set_event_handler(handler);

        Ok(Self { inner })
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn config(&self) -> &WalletConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.lock().connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }

    /// Connect to the session's broker.
    ///
    /// Resolves immediately when already connected. While a connection
    /// attempt is under way every caller gets its own handle, all resolved by
    /// the same `connected` event, and the transport is asked only once.
    pub fn connect(&self) -> Pending<()> {
        self.inner.connect()
    }

    /// Close the broker connection.
    ///
    /// Every handle still waiting on the broker is rejected: `connect`
    /// handles, the outstanding payment request (sent or not) and publishes
    /// awaiting their ack.
    pub fn disconnect(&self) {
        self.inner.transport.disconnect();
        self.inner.close("disconnect requested");
    }

    /// Ask the merchant for a signed payment request in `crypto_currency`, or
    /// in every supported currency with [`crate::topics::ALL_CRYPTOS`].
    ///
    /// Connects first when needed. The handle resolves with the next envelope
    /// received on the session's payment request topic. Only one request may
    /// be outstanding: a second call while the first is still awaited
    /// resolves with [`MantaError::RequestInFlight`].
    pub fn get_payment_request(&self, crypto_currency: &str) -> Pending<PaymentRequestEnvelope> {
        let mut state = self.inner.lock();
        if state.request_in_flight() {
            return Pending::failed(MantaError::RequestInFlight);
        }

        let (completer, pending) = pending();
        state.payment_request = Some(completer);

        let connection = state.connection;
        match connection {
            ConnectionState::Connected => {
                drop(state);
                self.inner.send_payment_request(crypto_currency);
            }
            ConnectionState::Connecting => {
                state.deferred_request = Some(crypto_currency.to_string());
            }
            ConnectionState::Disconnected => {
                state.deferred_request = Some(crypto_currency.to_string());
                drop(state);
                // The deferred request is rejected on connect failure.
                let _ = self.inner.connect();
            }
        }

        pending
    }

    /// The most recent envelope received for this session, if any.
    pub fn last_payment_request(&self) -> Option<PaymentRequestEnvelope> {
        self.inner.lock().last_envelope.clone()
    }

    /// Publish `payload` on `topic`.
    ///
    /// The handle resolves when the broker acknowledges this exact packet.
    pub fn publish(&self, topic: &str, payload: &[u8]) -> Pending<()> {
        self.inner.publish(topic, payload)
    }

    /// Report a payment to the merchant.
    ///
    /// Subscribes to the session's ack topic and publishes a payment message.
    /// The handle only confirms the broker accepted the publish; merchant
    /// acks arrive through [`MantaWallet::next_ack`].
    ///
    /// # Errors
    ///
    /// [`MantaError::Encoding`] when the payment message cannot be
    /// serialized. Transport failures resolve the returned handle instead.
    pub fn send_payment(&self, crypto_currency: &str, transaction_hash: &str) -> Result<Pending<()>> {
        let message = PaymentMessage::new(crypto_currency, transaction_hash);
        let payload = encode(&message)?;

        self.inner.log(
            LogRecord::new(LogLevel::Info, "Sending payment")
                .field("crypto_currency", crypto_currency)
                .field("transaction_hash", transaction_hash)
                .field("session_id", self.inner.session.session_id()),
        );

        if let Err(e) = self.inner.transport.subscribe(&self.inner.session.acks_topic()) {
            return Ok(Pending::failed(e));
        }
        Ok(self
            .inner
            .publish(&self.inner.session.payments_topic(), payload.as_bytes()))
    }

    /// Next merchant ack, in arrival order.
    pub fn next_ack(&self) -> Pending<AckMessage> {
        self.inner.acks.get()
    }

    /// The queue merchant acks are delivered to.
    pub fn acks(&self) -> &AsyncQueue<AckMessage> {
        &self.inner.acks
    }
}

impl<T: Transport> WalletInner<T> {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn log(&self, record: LogRecord) {
        self.logger.log(&record);
    }

    fn connect(&self) -> Pending<()> {
        let mut state = self.lock();
        let (completer, pending) = pending();
        let connection = state.connection;
        match connection {
            ConnectionState::Connected => return Pending::ready(()),
            ConnectionState::Connecting => {
                state.connect_waiters.push(completer);
                return pending;
            }
            ConnectionState::Disconnected => {
                state.connect_waiters.push(completer);
                state.connection = ConnectionState::Connecting;
            }
        }
        drop(state);

        let options = self.session.connect_options(&self.config);
        self.log(
            LogRecord::new(LogLevel::Debug, "Connecting to broker")
                .field("broker", options.authority())
                .field("client_id", &options.client_id),
        );
        if let Err(e) = self.transport.connect(&options) {
            self.log(LogRecord::new(LogLevel::Error, "Connect failed").field("error", &e));
            self.fail_connection(e);
        }
        pending
    }

    /// Drop back to Disconnected and reject everything waiting on the
    /// connection with `error`.
    fn fail_connection(&self, error: MantaError) {
        let mut state = self.lock();
        state.connection = ConnectionState::Disconnected;
        let waiters = std::mem::take(&mut state.connect_waiters);
        let deferred = match state.deferred_request.take() {
            Some(_) => state.payment_request.take(),
            None => None,
        };
        drop(state);

        for waiter in waiters {
            waiter.complete(Err(error.clone()));
        }
        if let Some(request) = deferred {
            request.complete(Err(error));
        }
    }

    fn mark_disconnected(&self, reason: &str) {
        self.fail_connection(MantaError::Transport(reason.to_string()));
    }

    /// Engine-initiated close. No reply can arrive after this, so replies
    /// already in flight are rejected as well.
    fn close(&self, reason: &str) {
        let error = MantaError::Transport(reason.to_string());
        self.fail_connection(error.clone());

        let mut state = self.lock();
        let request = state.payment_request.take();
        let publishes: Vec<_> = state.publish_acks.drain().map(|(_, waiter)| waiter).collect();
        drop(state);

        if let Some(request) = request {
            request.complete(Err(error.clone()));
        }
        for waiter in publishes {
            waiter.complete(Err(error.clone()));
        }
    }

    fn send_payment_request(&self, crypto_currency: &str) {
        let result = self
            .transport
            .subscribe(&self.session.payment_requests_topic())
            .and_then(|()| {
                self.transport
                    .publish(&self.session.payment_request_topic(crypto_currency), b"")
            });

        match result {
            Ok(_) => self.log(
                LogRecord::new(LogLevel::Debug, "Requested payment request")
                    .field("crypto_currency", crypto_currency)
                    .field("session_id", self.session.session_id()),
            ),
            Err(e) => {
                self.log(
                    LogRecord::new(LogLevel::Error, "Payment request could not be sent")
                        .field("error", &e),
                );
                let slot = self.lock().payment_request.take();
                if let Some(request) = slot {
                    request.complete(Err(e));
                }
            }
        }
    }

    fn publish(&self, topic: &str, payload: &[u8]) -> Pending<()> {
        let mut state = self.lock();
        let packet_id = match self.transport.publish(topic, payload) {
            Ok(packet_id) => packet_id,
            Err(e) => return Pending::failed(e),
        };
        let (completer, pending) = pending();
        let replaced = state.publish_acks.insert(packet_id, completer);
        drop(state);

        if replaced.is_some() {
            self.log(
                LogRecord::new(LogLevel::Warn, "Packet id reused before its ack arrived")
                    .field("packet_id", packet_id),
            );
        }
        pending
    }

    fn handle_payment_request(&self, session_id: &str, envelope: PaymentRequestEnvelope) {
        let mut state = self.lock();
        state.last_envelope = Some(envelope.clone());
        let slot = state.payment_request.take();
        drop(state);

        self.log(LogRecord::new(LogLevel::Info, "Payment request received").field("session_id", session_id));
        if let Some(request) = slot {
            request.complete(Ok(envelope));
        }
    }

    fn handle_ack(&self, session_id: &str, ack: AckMessage) {
        self.log(
            LogRecord::new(LogLevel::Info, "Ack received")
                .field("status", ack.status.as_str())
                .field("txid", &ack.txid)
                .field("session_id", session_id),
        );
        if let Some(evicted) = self.acks.put(ack) {
            self.log(
                LogRecord::new(LogLevel::Warn, "Ack buffer full, dropped oldest ack")
                    .field("txid", evicted.txid),
            );
        }
    }
}

impl<T: Transport> TransportEvents for WalletInner<T> {
    fn on_connected(&self) {
        let mut state = self.lock();
        state.connection = ConnectionState::Connected;
        let waiters = std::mem::take(&mut state.connect_waiters);
        let deferred = state.deferred_request.take();
        drop(state);

        self.log(LogRecord::new(LogLevel::Info, "Connected").field("client_id", self.session.client_id()));
        for waiter in waiters {
            waiter.complete(Ok(()));
        }
        if let Some(crypto_currency) = deferred {
            self.send_payment_request(&crypto_currency);
        }
    }

    fn on_publish_ack(&self, packet_id: PacketId) {
        let waiter = self.lock().publish_acks.remove(&packet_id);
        self.log(LogRecord::new(LogLevel::Debug, "Publish acknowledged").field("packet_id", packet_id));
        if let Some(waiter) = waiter {
            waiter.complete(Ok(()));
        }
    }

    fn on_message(&self, topic: &str, payload: &[u8]) {
        self.log(
            LogRecord::new(LogLevel::Debug, "Message received")
                .field("topic", topic)
                .field("size", payload.len()),
        );

        match route(topic, payload) {
            Ok(InboundMessage::PaymentRequest {
                session_id,
                envelope,
            }) => self.handle_payment_request(&session_id, envelope),
            Ok(InboundMessage::Ack { session_id, ack }) => self.handle_ack(&session_id, ack),
            Err(e) => self.log(
                LogRecord::new(LogLevel::Error, "Dropped inbound message")
                    .field("topic", topic)
                    .field("error", &e),
            ),
        }
    }

    fn on_disconnected(&self, reason: Option<&str>) {
        let reason = reason.unwrap_or("connection closed");
        self.log(LogRecord::new(LogLevel::Info, "Disconnected").field("reason", reason));
        self.mark_disconnected(reason);
    }
}

impl<T: Transport> Drop for WalletInner<T> {
    fn drop(&mut self) {
        self.transport.disconnect();
    }
}
