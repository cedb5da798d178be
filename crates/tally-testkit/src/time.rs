//! Controllable clock

use parking_lot::Mutex;
use std::sync::Arc;
use tally_core::effects::{PhysicalTimeEffects, TimeError};
use tally_core::Timestamp;

/// Controllable time source for deterministic testing
///
/// Clones share the same clock, so a test can hand one clone to a ledger and
/// keep another to move time.
#[derive(Debug, Clone)]
pub struct ControllableTimeSource {
    current_time: Arc<Mutex<u64>>,
}

impl ControllableTimeSource {
    /// Create new controllable time source starting at given timestamp
    pub fn new(initial_timestamp: u64) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(initial_timestamp)),
        }
    }

    /// Advance time by given number of seconds
    pub fn advance_time(&self, seconds: u64) {
        let mut current = self.current_time.lock();
        *current += seconds;
    }

    /// Set absolute time
    pub fn set_time(&self, timestamp: u64) {
        *self.current_time.lock() = timestamp;
    }

    /// Get current time
    pub fn current_timestamp(&self) -> u64 {
        *self.current_time.lock()
    }
}

impl PhysicalTimeEffects for ControllableTimeSource {
    fn physical_time(&self) -> Result<Timestamp, TimeError> {
        Ok(Timestamp(self.current_timestamp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_clock() {
        let clock = ControllableTimeSource::new(10);
        let view = clock.clone();
        clock.advance_time(5);
        assert_eq!(view.physical_time(), Ok(Timestamp(15)));
        view.set_time(3);
        assert_eq!(clock.current_timestamp(), 3);
    }
}
