//! Tally Authorization - M-of-N quorum over pre-approved operation hashes
//!
//! A privileged action is authorized out of band: owners sign the signed
//! hash of the exact call (function, arguments, nonce, ledger), anyone
//! submits the signatures with [`QuorumLedger::add_approval`], and the action
//! itself runs through [`QuorumLedger::execute_gated`], which recomputes
//! nothing and trusts nothing but the pending set. The gated caller is
//! responsible for recomputing the hash from its own arguments.
//!
//! ```
//! use tally_authorization::{ActionArg, DomainSeparator, OwnerSet, QuorumLedger};
//! use tally_core::Address;
//! use tally_testkit::{FakeSigner, FakeVerifier};
//!
//! let owners = [FakeSigner::new("a"), FakeSigner::new("b")];
//! let set = OwnerSet::new(owners.iter().map(FakeSigner::address).collect(), 2)?;
//! let ledger = QuorumLedger::new(
//!     DomainSeparator::new("Example", Address::from_label("example")),
//!     set,
//!     FakeVerifier,
//! );
//!
//! let user = Address::from_label("user");
//! let hash = ledger.signed_hash("getFreeReward(address,uint256)", &[ActionArg::Address(user)], 0);
//! let sigs: Vec<_> = owners.iter().map(|o| o.sign(&hash)).collect();
//! ledger.add_approval(user, hash, &sigs)?;
//!
//! let paid = ledger.execute_gated(hash, || Ok("paid"))?;
//! assert_eq!(paid, "paid");
//! assert!(ledger.execute_gated(hash, || Ok("again")).is_err());
//! # Ok::<(), tally_core::TallyError>(())
//! ```

#![forbid(unsafe_code)]

pub mod action;
pub mod ledger;
pub mod owners;
pub mod quorum;

pub use action::{compute_action_hash, hash_to_sign, ActionArg, ActionEncoder, DomainSeparator};
pub use ledger::{AuthorizationEvent, OperationStatus, QuorumLedger};
pub use owners::OwnerSet;
pub use quorum::verify_quorum;
