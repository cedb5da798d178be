//! System clock handler

use std::time::{SystemTime, UNIX_EPOCH};
use tally_core::effects::{PhysicalTimeEffects, TimeError};
use tally_core::Timestamp;

/// Real time handler for production use
///
/// Stateless; every call reads the operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

impl PhysicalTimeEffects for RealTimeHandler {
    fn physical_time(&self) -> Result<Timestamp, TimeError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| Timestamp(d.as_secs()))
            .map_err(|_| TimeError::BeforeEpoch)
    }
}
