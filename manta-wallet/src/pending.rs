//! Single-assignment completion handles.
//!
//! Every asynchronous engine operation hands the caller a [`Pending`] and
//! keeps the matching [`Completer`] in its own state. The completer is
//! consumed when the operation resolves, so a result can be delivered at most
//! once. Completing a handle whose `Pending` was already dropped is a no-op.

use crate::{MantaError, Result};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Create a linked completer / pending pair.
pub(crate) fn pending<T>() -> (Completer<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Completer { tx }, Pending { rx })
}

/// Caller side of an in-flight operation.
///
/// Resolves to the operation result, or to [`MantaError::Abandoned`] if the
/// engine dropped the operation without resolving it.
#[must_use = "a Pending does nothing unless awaited or polled"]
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// An already resolved success.
    pub fn ready(value: T) -> Self {
        Self::resolved(Ok(value))
    }

    /// An already resolved failure.
    pub fn failed(error: MantaError) -> Self {
        Self::resolved(Err(error))
    }

    fn resolved(result: Result<T>) -> Self {
        let (completer, pending) = pending();
        completer.complete(result);
        pending
    }

    /// Take the result without waiting.
    ///
    /// Returns `None` while unresolved. A result is handed out once; asking
    /// again afterwards yields `Abandoned`.
    pub fn try_result(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(MantaError::Abandoned)),
        }
    }

    /// Wait at most `duration` for the result.
    ///
    /// On expiry the handle is dropped, so a late completion is discarded.
    pub async fn timeout(self, duration: Duration) -> Result<T> {
        tokio::time::timeout(duration, self)
            .await
            .map_err(|_| MantaError::Timeout(duration))?
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(MantaError::Abandoned)))
    }
}

/// Engine side of an in-flight operation.
#[derive(Debug)]
pub(crate) struct Completer<T> {
    tx: oneshot::Sender<Result<T>>,
}

impl<T> Completer<T> {
    /// Resolve the operation. Returns `false` if nobody is listening anymore.
    pub(crate) fn complete(self, result: Result<T>) -> bool {
        self.tx.send(result).is_ok()
    }

    /// Resolve the operation, handing the result back if nobody is listening.
    pub(crate) fn try_complete(self, result: Result<T>) -> std::result::Result<(), Result<T>> {
        self.tx.send(result)
    }

    /// Whether the caller dropped its `Pending`.
    pub(crate) fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[test]
    fn test_ready_and_failed() {
        let mut ready = Pending::ready(7);
        assert_eq!(ready.try_result(), Some(Ok(7)));

        let mut failed: Pending<u8> = Pending::failed(MantaError::RequestInFlight);
        assert_eq!(failed.try_result(), Some(Err(MantaError::RequestInFlight)));
    }

    #[test]
    fn test_resolves_once_completed() {
        let (completer, pending) = pending::<&str>();
        let mut fut = task::spawn(pending);
        assert_pending!(fut.poll());

        assert!(completer.complete(Ok("done")));
        assert!(fut.is_woken());
        assert_ready_eq!(fut.poll(), Ok("done"));
    }

    #[test]
    fn test_dropped_completer_abandons() {
        let (completer, mut pending) = pending::<()>();
        assert_eq!(pending.try_result(), None);
        drop(completer);
        assert_eq!(pending.try_result(), Some(Err(MantaError::Abandoned)));
    }

    #[test]
    fn test_completing_after_caller_left_is_noop() {
        let (completer, pending) = pending::<u32>();
        assert!(!completer.is_abandoned());
        drop(pending);
        assert!(completer.is_abandoned());
        assert_eq!(completer.try_complete(Ok(1)), Err(Ok(1)));
    }

    #[tokio::test]
    async fn test_timeout_expires_and_late_completion_is_ignored() {
        let (completer, pending) = pending::<u32>();
        let result = pending.timeout(Duration::from_millis(20)).await;
        assert_eq!(result, Err(MantaError::Timeout(Duration::from_millis(20))));
        assert!(!completer.complete(Ok(5)));
    }

    #[tokio::test]
    async fn test_timeout_passes_result_through() {
        let (completer, pending) = pending::<u32>();
        completer.complete(Ok(5));
        assert_eq!(pending.timeout(Duration::from_secs(1)).await, Ok(5));
    }
}
