//! Append-only event log kept alongside ledger state
//!
//! Ledgers push events while holding their write lock, after the transition
//! has succeeded, so the log never shows an event for a rolled-back
//! operation.

use serde::{Deserialize, Serialize};

/// Ordered record of events emitted by one ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog<E> {
    events: Vec<E>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E: Clone> EventLog<E> {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&mut self, event: E) {
        self.events.push(event);
    }

    /// Copy of every event recorded so far
    pub fn snapshot(&self) -> Vec<E> {
        self.events.clone()
    }

    /// Remove and return every recorded event
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Most recent event
    pub fn last(&self) -> Option<&E> {
        self.events.last()
    }
}
