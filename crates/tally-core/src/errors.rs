//! Unified error system for Tally ledgers
//!
//! Every failure a ledger can report is one variant of [`TallyError`]. Each
//! variant carries a stable machine-readable code (see [`TallyError::code`])
//! so callers can branch on the failure without parsing display text.

use crate::identifiers::{Address, Hash32};
use crate::types::TokenAmount;
use serde::{Deserialize, Serialize};

/// Unified error type for all Tally operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TallyError {
    /// A signature failed to verify or was produced by a non-owner
    #[error("signer is not owner: {signer}")]
    UnknownSigner {
        /// Address recovered for the offending signature
        signer: Address,
    },

    /// Fewer distinct owner signers than the threshold requires
    #[error("no enough confirms: {have} of {need}")]
    InsufficientSignatures {
        /// Distinct verified signers, caller included
        have: usize,
        /// Configured threshold
        need: usize,
    },

    /// A gated call found no pending approval for its hash
    #[error("operation not in pending: {hash}")]
    OperationNotPending {
        /// Signed hash the gated call recomputed
        hash: Hash32,
    },

    /// The hash is already pending or was consumed earlier
    #[error("operation already approved or consumed: {hash}")]
    DuplicateOperation {
        /// Signed hash submitted for approval
        hash: Hash32,
    },

    /// Owner-only call made by a non-owner
    #[error("caller is not owner: {caller}")]
    NotOwner {
        /// Address of the rejected caller
        caller: Address,
    },

    /// Custody holds fewer deposits than the operation owes
    #[error("Insufficient deposits: need {needed}, hold {available}")]
    InsufficientDeposits {
        /// Amount the operation must pay out
        needed: TokenAmount,
        /// Amount currently held
        available: TokenAmount,
    },

    /// An account lacks balance or allowance for a transfer
    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Amount the transfer requires
        needed: TokenAmount,
        /// Balance or allowance available
        available: TokenAmount,
    },

    /// The clock reads earlier than the schedule start
    #[error("release schedule not started: starts at {starts_at}, now {now}")]
    ScheduleNotStarted {
        /// First injection time in seconds
        starts_at: u64,
        /// Clock reading in seconds
        now: u64,
    },

    /// Injection attempted outside the configured activity window
    #[error("outside activity window [{start}, {end}] at {now}")]
    OutsideActivityWindow {
        /// Window start in seconds
        start: u64,
        /// Window end in seconds
        end: u64,
        /// Clock reading in seconds
        now: u64,
    },

    /// Amount argument rejected (zero or out of range)
    #[error("Invalid amount: {message}")]
    InvalidAmount {
        /// Error message describing the rejected amount
        message: String,
    },

    /// Randomness callback for an unknown or settled request
    #[error("unknown randomness request: {request_id}")]
    UnknownRequest {
        /// Request identifier delivered by the callback
        request_id: u64,
    },

    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Token collaborator rejected a call
    #[error("Token error: {message}")]
    Token {
        /// Error message reported by the token collaborator
        message: String,
    },

    /// Clock source failure
    #[error("Time error: {message}")]
    Time {
        /// Error message describing the clock failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl TallyError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create an invalid amount error
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    /// Create a token collaborator error
    pub fn token(message: impl Into<String>) -> Self {
        Self::Token {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Arithmetic overflow while computing `what`
    pub fn overflow(what: &str) -> Self {
        Self::Internal {
            message: format!("arithmetic overflow computing {what}"),
        }
    }

    /// Stable code identifying the failure kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownSigner { .. } => "UNKNOWN_SIGNER",
            Self::InsufficientSignatures { .. } => "INSUFFICIENT_SIGNATURES",
            Self::OperationNotPending { .. } => "OPERATION_NOT_PENDING",
            Self::DuplicateOperation { .. } => "DUPLICATE_OPERATION",
            Self::NotOwner { .. } => "NOT_OWNER",
            Self::InsufficientDeposits { .. } => "INSUFFICIENT_DEPOSITS",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::ScheduleNotStarted { .. } => "SCHEDULE_NOT_STARTED",
            Self::OutsideActivityWindow { .. } => "OUTSIDE_ACTIVITY_WINDOW",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::UnknownRequest { .. } => "UNKNOWN_REQUEST",
            Self::Invalid { .. } => "INVALID",
            Self::Token { .. } => "TOKEN",
            Self::Time { .. } => "TIME",
            Self::Internal { .. } => "INTERNAL",
        }
    }
}

/// Standard Result type for Tally operations
pub type Result<T> = std::result::Result<T, TallyError>;

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::invalid(format!("config io: {err}"))
    }
}

impl From<toml::de::Error> for TallyError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid(format!("config parse: {err}"))
    }
}

impl From<crate::effects::TimeError> for TallyError {
    fn from(err: crate::effects::TimeError) -> Self {
        Self::Time {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TallyError::invalid("test message");
        assert!(matches!(err, TallyError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: test message");
    }

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            TallyError::UnknownSigner {
                signer: Address::ZERO,
            },
            TallyError::InsufficientSignatures { have: 1, need: 2 },
            TallyError::OperationNotPending { hash: Hash32::ZERO },
            TallyError::DuplicateOperation { hash: Hash32::ZERO },
            TallyError::NotOwner {
                caller: Address::ZERO,
            },
            TallyError::InsufficientDeposits {
                needed: TokenAmount::ZERO,
                available: TokenAmount::ZERO,
            },
            TallyError::InsufficientFunds {
                needed: TokenAmount::ZERO,
                available: TokenAmount::ZERO,
            },
            TallyError::ScheduleNotStarted {
                starts_at: 1,
                now: 0,
            },
            TallyError::OutsideActivityWindow {
                start: 0,
                end: 1,
                now: 2,
            },
            TallyError::invalid_amount("zero"),
            TallyError::UnknownRequest { request_id: 1 },
            TallyError::invalid("x"),
            TallyError::token("x"),
            TallyError::Time {
                message: "x".into(),
            },
            TallyError::internal("x"),
        ];
        let mut codes: Vec<_> = errors.iter().map(TallyError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_gate_messages_match_ledger_wording() {
        let err = TallyError::OperationNotPending { hash: Hash32::ZERO };
        assert!(err.to_string().starts_with("operation not in pending"));
        let err = TallyError::InsufficientSignatures { have: 1, need: 2 };
        assert!(err.to_string().starts_with("no enough confirms"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = TallyError::from(io_err);
        assert_eq!(err.code(), "INVALID");
    }
}
