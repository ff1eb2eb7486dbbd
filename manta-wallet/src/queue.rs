//! FIFO queue with awaitable `get`.
//!
//! Producers call [`AsyncQueue::put`] from any context; consumers call
//! [`AsyncQueue::get`] and await the returned [`Pending`]. Items are handed
//! out in insertion order and waiters are served in the order they called
//! `get`. An item goes either to exactly one waiter or into the buffer, never
//! both.

use crate::pending::{pending, Completer, Pending};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    waiters: VecDeque<Completer<T>>,
}

/// Unbounded or bounded FIFO of items awaiting a consumer.
#[derive(Debug)]
pub struct AsyncQueue<T> {
    state: Mutex<QueueState<T>>,
    capacity: Option<usize>,
}

impl<T> AsyncQueue<T> {
    /// Queue that buffers every unconsumed item.
    pub fn new() -> Self {
        Self::with_capacity_limit(None)
    }

    /// Queue that keeps at most `limit` unconsumed items, evicting the oldest.
    /// `None` means unbounded.
    pub fn with_capacity_limit(limit: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                waiters: VecDeque::new(),
            }),
            capacity: limit,
        }
    }

    /// Add an item.
    ///
    /// The oldest live waiter receives it directly. Waiters whose `Pending`
    /// was dropped are skipped. With no live waiter the item is buffered;
    /// if that overflows the capacity limit the oldest buffered item is
    /// evicted and returned.
    pub fn put(&self, item: T) -> Option<T> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let mut item = item;
        while let Some(waiter) = state.waiters.pop_front() {
            match waiter.try_complete(Ok(item)) {
                Ok(()) => return None,
                Err(Ok(back)) => item = back,
                // Only Ok items are sent.
                Err(Err(_)) => return None,
            }
        }

        state.items.push_back(item);
        match self.capacity {
            Some(limit) if state.items.len() > limit => state.items.pop_front(),
            _ => None,
        }
    }

    /// Take the next item.
    ///
    /// Resolves immediately when an item is buffered, otherwise when a later
    /// `put` delivers one.
    pub fn get(&self) -> Pending<T> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(item) = state.items.pop_front() {
            return Pending::ready(item);
        }

        let (completer, pending) = pending();
        state.waiters.retain(|w| !w.is_abandoned());
        state.waiters.push_back(completer);
        pending
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .items
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live consumers waiting for an item.
    pub fn waiting(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .waiters
            .iter()
            .filter(|w| !w.is_abandoned())
            .count()
    }
}

impl<T> Default for AsyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
