//! Last-request-wins result slot.
//!
//! Each request takes a [`Ticket`] before it starts. When its result arrives
//! it is stored only if no newer request has already stored one, so a slow
//! response to an old query never replaces the answer to a newer query.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

struct SlotState<T> {
    applied: u64,
    value: Option<T>,
}

pub struct LatestSlot<T> {
    issued: AtomicU64,
    state: Mutex<SlotState<T>>,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            state: Mutex::new(SlotState {
                applied: 0,
                value: None,
            }),
        }
    }

    /// Register a new request.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Store `value` unless a newer ticket already stored a result.
    /// Returns whether the value was stored.
    pub fn apply(&self, ticket: Ticket, value: T) -> bool {
        let mut state = self.state.lock();
        if ticket.0 <= state.applied {
            metrics::counter!("tridium.provider.stale_results").increment(1);
            debug!(
                ticket = ticket.0,
                applied = state.applied,
                "Discarding stale result"
            );
            return false;
        }
        state.applied = ticket.0;
        state.value = Some(value);
        true
    }

    /// Take the stored value, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        self.state.lock().value.take()
    }
}

impl<T: Clone> LatestSlot<T> {
    pub fn get(&self) -> Option<T> {
        self.state.lock().value.clone()
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
