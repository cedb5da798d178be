//! Quorum authorization ledger
//!
//! Holds the owner set and the status of every signed hash it has seen.
//!
//! # Operation Lifecycle
//!
//! ```text
//! Absent ──add_approval──▶ Pending ──execute_gated / consume_pending──▶ Consumed
//!    │                                                                     ▲
//!    └──────────────────────────authorize_now──────────────────────────────┘
//! ```
//!
//! `Consumed` is terminal: a consumed hash is remembered and can never be
//! approved again, so a gated action runs at most once per approval. Callers
//! make repeated actions distinct by choosing a fresh nonce.
//!
//! All transitions run under one write lock; queries take the read lock.

use crate::action::{compute_action_hash, hash_to_sign, ActionArg, DomainSeparator};
use crate::owners::OwnerSet;
use crate::quorum::verify_quorum;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tally_core::effects::SignatureEffects;
use tally_core::{
    Address, AuthorizationConfig, EventLog, Hash32, Result, SignerSignature, TallyError,
};

/// Status of a signed hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    /// Never approved
    Absent,
    /// Approved and waiting for its gated action
    Pending,
    /// Approval used up
    Consumed,
}

/// Events recorded by the authorization ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationEvent {
    /// A signed hash became pending
    OperationAdded {
        /// Signed hash
        hash: Hash32,
        /// Owners whose approval was counted
        approvers: Vec<Address>,
    },
    /// A signed hash was used by its gated action
    OperationConsumed {
        /// Signed hash
        hash: Hash32,
    },
    /// An owner handed its slot to a new address
    OwnershipTransferred {
        /// Outgoing owner
        previous: Address,
        /// Incoming owner
        new: Address,
    },
}

#[derive(Debug)]
struct LedgerState {
    owners: OwnerSet,
    pending: HashSet<Hash32>,
    consumed: HashSet<Hash32>,
    events: EventLog<AuthorizationEvent>,
}

impl LedgerState {
    fn status(&self, hash: &Hash32) -> OperationStatus {
        if self.pending.contains(hash) {
            OperationStatus::Pending
        } else if self.consumed.contains(hash) {
            OperationStatus::Consumed
        } else {
            OperationStatus::Absent
        }
    }

    fn consume(&mut self, hash: Hash32) -> Result<()> {
        if !self.pending.remove(&hash) {
            tracing::warn!(hash = %hash, "operation not in pending");
            return Err(TallyError::OperationNotPending { hash });
        }
        self.consumed.insert(hash);
        self.events
            .record(AuthorizationEvent::OperationConsumed { hash });
        tracing::info!(hash = %hash, "operation consumed");
        Ok(())
    }
}

/// M-of-N authorization ledger over pre-approved operation hashes
#[derive(Debug)]
pub struct QuorumLedger<V> {
    domain: DomainSeparator,
    verifier: V,
    state: RwLock<LedgerState>,
}

impl<V: SignatureEffects> QuorumLedger<V> {
    /// Ledger for `domain` governed by `owners`
    pub fn new(domain: DomainSeparator, owners: OwnerSet, verifier: V) -> Self {
        Self {
            domain,
            verifier,
            state: RwLock::new(LedgerState {
                owners,
                pending: HashSet::new(),
                consumed: HashSet::new(),
                events: EventLog::new(),
            }),
        }
    }

    /// Ledger described by configuration
    pub fn from_config(config: &AuthorizationConfig, verifier: V) -> Result<Self> {
        let owners = OwnerSet::from_config(config)?;
        let domain = DomainSeparator::new(config.name.clone(), config.ledger_account);
        Ok(Self::new(domain, owners, verifier))
    }

    /// Domain bound into this ledger's action hashes
    pub fn domain(&self) -> &DomainSeparator {
        &self.domain
    }

    /// Action hash of a call in this ledger's domain
    pub fn action_hash(&self, function_signature: &str, args: &[ActionArg], nonce: u64) -> Hash32 {
        compute_action_hash(&self.domain, function_signature, args, nonce)
    }

    /// Signed hash owners must sign for a call in this ledger's domain
    pub fn signed_hash(&self, function_signature: &str, args: &[ActionArg], nonce: u64) -> Hash32 {
        hash_to_sign(&self.action_hash(function_signature, args, nonce))
    }

    /// Record `signed_hash` as approved once enough owners signed it.
    ///
    /// Anyone may submit. When `caller` is an owner it counts as one
    /// approver. Fails with `DuplicateOperation` if the hash is already
    /// pending or was consumed, `UnknownSigner` for any signature that is not
    /// a valid owner signature over `signed_hash`, and
    /// `InsufficientSignatures` below threshold. Failure changes nothing.
    pub fn add_approval(
        &self,
        caller: Address,
        signed_hash: Hash32,
        signatures: &[SignerSignature],
    ) -> Result<()> {
        let mut state = self.state.write();
        if state.status(&signed_hash) != OperationStatus::Absent {
            tracing::warn!(hash = %signed_hash, "operation already approved or consumed");
            return Err(TallyError::DuplicateOperation { hash: signed_hash });
        }
        let approvers = verify_quorum(
            &self.verifier,
            &state.owners,
            caller,
            &signed_hash,
            signatures,
        )?;
        state.pending.insert(signed_hash);
        state.events.record(AuthorizationEvent::OperationAdded {
            hash: signed_hash,
            approvers: approvers.into_iter().collect(),
        });
        tracing::info!(hash = %signed_hash, caller = %caller, "operation added");
        Ok(())
    }

    /// Verify quorum and consume `signed_hash` in one step, without passing
    /// through pending. Used by calls that carry their signatures inline.
    pub fn authorize_now(
        &self,
        caller: Address,
        signed_hash: Hash32,
        signatures: &[SignerSignature],
    ) -> Result<()> {
        let mut state = self.state.write();
        if state.status(&signed_hash) != OperationStatus::Absent {
            return Err(TallyError::DuplicateOperation { hash: signed_hash });
        }
        verify_quorum(
            &self.verifier,
            &state.owners,
            caller,
            &signed_hash,
            signatures,
        )?;
        state.consumed.insert(signed_hash);
        state
            .events
            .record(AuthorizationEvent::OperationConsumed { hash: signed_hash });
        tracing::info!(hash = %signed_hash, caller = %caller, "operation authorized inline");
        Ok(())
    }

    /// Use up a pending approval. Fails with `OperationNotPending` when the
    /// hash was never approved or was already consumed.
    pub fn consume_pending(&self, signed_hash: Hash32) -> Result<()> {
        self.state.write().consume(signed_hash)
    }

    /// Run `action` under the approval for `signed_hash`.
    ///
    /// The approval is consumed only if `action` returns `Ok`; an action that
    /// fails leaves it pending so the same approval can be retried. The
    /// ledger's write lock is held while `action` runs, so `action` must not
    /// call back into this ledger.
    pub fn execute_gated<T, F>(&self, signed_hash: Hash32, action: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut state = self.state.write();
        if !state.pending.contains(&signed_hash) {
            tracing::warn!(hash = %signed_hash, "operation not in pending");
            return Err(TallyError::OperationNotPending { hash: signed_hash });
        }
        let output = action().map_err(|err| {
            tracing::warn!(hash = %signed_hash, code = err.code(), "gated action failed; approval kept");
            err
        })?;
        state.consume(signed_hash)?;
        Ok(output)
    }

    /// Hand `caller`'s owner slot to `new_owner`. Only the slot holder can
    /// transfer it, and `new_owner` must not already own a slot.
    pub fn transfer_ownership(&self, caller: Address, new_owner: Address) -> Result<()> {
        let mut state = self.state.write();
        state.owners.replace(caller, new_owner)?;
        state.events.record(AuthorizationEvent::OwnershipTransferred {
            previous: caller,
            new: new_owner,
        });
        tracing::info!(previous = %caller, new = %new_owner, "ownership transferred");
        Ok(())
    }

    /// Fail with `NotOwner` unless `caller` holds an owner slot
    pub fn require_owner(&self, caller: Address) -> Result<()> {
        if self.state.read().owners.contains(&caller) {
            Ok(())
        } else {
            Err(TallyError::NotOwner { caller })
        }
    }

    /// Current owners in slot order
    pub fn owners(&self) -> Vec<Address> {
        self.state.read().owners.owners().to_vec()
    }

    /// Required distinct approvers
    pub fn threshold(&self) -> usize {
        self.state.read().owners.threshold()
    }

    /// Status of `signed_hash`
    pub fn status(&self, signed_hash: &Hash32) -> OperationStatus {
        self.state.read().status(signed_hash)
    }

    /// True while `signed_hash` is approved and unused
    pub fn is_pending(&self, signed_hash: &Hash32) -> bool {
        self.status(signed_hash) == OperationStatus::Pending
    }

    /// True once `signed_hash` has been used up
    pub fn is_consumed(&self, signed_hash: &Hash32) -> bool {
        self.status(signed_hash) == OperationStatus::Consumed
    }

    /// Events recorded so far
    pub fn events(&self) -> Vec<AuthorizationEvent> {
        self.state.read().events.snapshot()
    }

    /// Remove and return recorded events
    pub fn drain_events(&self) -> Vec<AuthorizationEvent> {
        self.state.write().events.drain()
    }
}
