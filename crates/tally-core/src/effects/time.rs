//! Wall-clock time.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `tally-effects` (`RealTimeHandler`)
//! - **Testing**: `tally-testkit` (`ControllableTimeSource`)

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// The clock reads earlier than the Unix epoch
    #[error("Clock before Unix epoch")]
    BeforeEpoch,
    /// The clock could not be read
    #[error("Time service unavailable: {reason}")]
    ServiceUnavailable {
        /// Handler-specific reason
        reason: String,
    },
}

/// Source of the current wall-clock time in whole seconds.
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current time
    fn physical_time(&self) -> Result<Timestamp, TimeError>;
}

impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for Arc<T> {
    fn physical_time(&self) -> Result<Timestamp, TimeError> {
        (**self).physical_time()
    }
}
