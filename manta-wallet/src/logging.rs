//! Injectable structured logging.
//!
//! The engine logs through an `Arc<dyn Logger>` handed to it at construction.
//! [`TracingLogger`] is the default and forwards to `tracing`; applications
//! that ship logs to a Logstash TCP input use [`LogstashLogger`], and
//! [`FanoutLogger`] combines several backends.

use crate::{MantaError, Result};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log event with its source location and key/value fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub file: &'static str,
    pub line: u32,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    /// Build a record located at the caller.
    #[track_caller]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            level,
            file: location.file(),
            line: location.line(),
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Attach a key/value field.
    pub fn field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Value of the first field named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn fields_display(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A log sink. Implementations must not block.
pub trait Logger: Send + Sync {
    fn log(&self, record: &LogRecord);
}

/// Forwards records to the `tracing` crate under target `manta_wallet`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, record: &LogRecord) {
        let fields = record.fields_display();
        match record.level {
            LogLevel::Debug => tracing::debug!(
                target: "manta_wallet",
                file = record.file,
                line = record.line,
                fields = %fields,
                "{}",
                record.message
            ),
            LogLevel::Info => tracing::info!(
                target: "manta_wallet",
                file = record.file,
                line = record.line,
                fields = %fields,
                "{}",
                record.message
            ),
            LogLevel::Warn => tracing::warn!(
                target: "manta_wallet",
                file = record.file,
                line = record.line,
                fields = %fields,
                "{}",
                record.message
            ),
            LogLevel::Error => tracing::error!(
                target: "manta_wallet",
                file = record.file,
                line = record.line,
                fields = %fields,
                "{}",
                record.message
            ),
        }
    }
}

/// Sends every record to each of its backends in order.
#[derive(Clone, Default)]
pub struct FanoutLogger {
    backends: Vec<Arc<dyn Logger>>,
}

impl FanoutLogger {
    pub fn new(backends: Vec<Arc<dyn Logger>>) -> Self {
        Self { backends }
    }

    pub fn with(mut self, backend: Arc<dyn Logger>) -> Self {
        self.backends.push(backend);
        self
    }
}

impl Logger for FanoutLogger {
    fn log(&self, record: &LogRecord) {
        for backend in &self.backends {
            backend.log(record);
        }
    }
}

/// Lines kept while the Logstash endpoint is unreachable. The handoff
/// channel to the writer holds at most as many.
pub const LOGSTASH_BACKLOG: usize = 1024;

/// Connect attempts to the Logstash endpoint give up after this long.
pub const LOGSTASH_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Ships records as newline-delimited JSON to a Logstash TCP input.
///
/// Each line carries `level`, `filename`, `line`, `message`, the record
/// fields and then the static `extra` fields; a record key is never
/// overwritten by an extra field. Writing happens on a background tokio task.
/// While the endpoint is down lines are kept in a bounded backlog (oldest
/// dropped first) and a reconnect is attempted when the next record arrives.
/// Records logged while the handoff channel is full, such as during a slow
/// connect attempt, are dropped.
#[derive(Clone)]
pub struct LogstashLogger {
    tx: mpsc::Sender<String>,
    extra: Arc<Map<String, Value>>,
}

impl LogstashLogger {
    /// Start the background writer for `addr` (`host:port`).
    ///
    /// # Errors
    ///
    /// [`MantaError::Transport`] when called outside a tokio runtime.
    pub fn spawn(addr: impl Into<String>, extra: Map<String, Value>) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| MantaError::Transport(format!("logstash writer needs a runtime: {}", e)))?;
        let (tx, rx) = mpsc::channel(LOGSTASH_BACKLOG);
        handle.spawn(run_logstash_writer(addr.into(), rx));
        Ok(Self {
            tx,
            extra: Arc::new(extra),
        })
    }

    /// Render a record as one JSON line, without the trailing newline.
    pub fn render(&self, record: &LogRecord) -> String {
        let mut object = Map::new();
        object.insert("level".into(), Value::from(record.level.as_str()));
        object.insert("filename".into(), Value::from(record.file));
        object.insert("line".into(), Value::from(record.line));
        object.insert("message".into(), Value::from(record.message.as_str()));
        for (key, value) in &record.fields {
            object.insert(key.clone(), Value::from(value.as_str()));
        }
        for (key, value) in self.extra.iter() {
            object.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(object).to_string()
    }
}

impl Logger for LogstashLogger {
    fn log(&self, record: &LogRecord) {
        // Full channel or a writer gone with its runtime: drop the line.
        let _ = self.tx.try_send(self.render(record));
    }
}

async fn run_logstash_writer(addr: String, mut rx: mpsc::Receiver<String>) {
    let mut backlog: VecDeque<String> = VecDeque::new();
    let mut stream: Option<TcpStream> = None;

    while let Some(line) = rx.recv().await {
        backlog.push_back(line);
        while let Ok(line) = rx.try_recv() {
            backlog.push_back(line);
        }
        while backlog.len() > LOGSTASH_BACKLOG {
            backlog.pop_front();
        }

        if stream.is_none() {
            match tokio::time::timeout(LOGSTASH_CONNECT_TIMEOUT, TcpStream::connect(&addr)).await {
                Ok(Ok(connected)) => stream = Some(connected),
                Ok(Err(e)) => {
                    tracing::debug!(target: "manta_wallet", "logstash connect to {} failed: {}", addr, e);
                    continue;
                }
                Err(_) => {
                    tracing::debug!(target: "manta_wallet", "logstash connect to {} timed out", addr);
                    continue;
                }
            }
        }

        if let Some(socket) = stream.as_mut() {
            while let Some(line) = backlog.front() {
                let mut bytes = line.clone().into_bytes();
                bytes.push(b'\n');
                if let Err(e) = socket.write_all(&bytes).await {
                    tracing::debug!(target: "manta_wallet", "logstash write failed: {}", e);
                    stream = None;
                    break;
                }
                backlog.pop_front();
            }
        }
    }
}
