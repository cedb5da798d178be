//! Action hashing
//!
//! An action hash commits to everything that makes a privileged call unique:
//! the ledger it targets ([`DomainSeparator`]), the function signature, every
//! argument, and a nonce chosen by the caller. Owners never sign the action
//! hash itself; they sign [`hash_to_sign`] of it, and approvals are keyed by
//! that signed hash.
//!
//! # Encoding
//!
//! ```text
//! "tally.action.v1"
//! domain digest                       32 bytes
//! u32 BE length ‖ function signature
//! per argument: tag ‖ payload
//!     0x01 address                    20 bytes
//!     0x02 amount                     16 bytes BE
//!     0x03 u64                        8 bytes BE
//!     0x04 bytes / 0x05 string        u32 BE length ‖ data
//! 0x06 nonce                          8 bytes BE
//! ```
//!
//! Tags and length prefixes keep distinct argument lists from colliding.

use serde::{Deserialize, Serialize};
use tally_core::hash::hasher;
use tally_core::{Address, Hash32, TokenAmount};

const ACTION_VERSION: &[u8] = b"tally.action.v1";
const DOMAIN_VERSION: &[u8] = b"tally.domain.v1";

/// Prefix of the signed-message envelope
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Tally Signed Message:\n32";

const TAG_ADDRESS: u8 = 0x01;
const TAG_AMOUNT: u8 = 0x02;
const TAG_U64: u8 = 0x03;
const TAG_BYTES: u8 = 0x04;
const TAG_STRING: u8 = 0x05;
const TAG_NONCE: u8 = 0x06;

fn len_prefix(len: usize) -> [u8; 4] {
    u32::try_from(len).unwrap_or(u32::MAX).to_be_bytes()
}

/// Identity of the ledger an action targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSeparator {
    /// Ledger name
    pub name: String,
    /// The ledger's own account
    pub ledger_account: Address,
}

impl DomainSeparator {
    /// Domain for `name` hosted at `ledger_account`
    pub fn new(name: impl Into<String>, ledger_account: Address) -> Self {
        Self {
            name: name.into(),
            ledger_account,
        }
    }

    /// Digest bound into every action hash of this domain
    pub fn digest(&self) -> Hash32 {
        let mut h = hasher();
        h.update(DOMAIN_VERSION);
        h.update(&len_prefix(self.name.len()));
        h.update(self.name.as_bytes());
        h.update(self.ledger_account.as_bytes());
        Hash32(h.finalize())
    }
}

/// One typed argument of a privileged call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionArg {
    /// Account argument
    Address(Address),
    /// Token amount argument
    Amount(TokenAmount),
    /// Integer argument
    U64(u64),
    /// Raw bytes argument
    Bytes(Vec<u8>),
    /// Text argument
    Str(String),
}

/// Incremental builder for action hashes
pub struct ActionEncoder {
    inner: Box<dyn tally_core::hash::Hasher>,
}

impl ActionEncoder {
    /// Start encoding a call to `function_signature` in `domain`
    pub fn new(domain: &DomainSeparator, function_signature: &str) -> Self {
        let mut inner = hasher();
        inner.update(ACTION_VERSION);
        inner.update(domain.digest().as_bytes());
        inner.update(&len_prefix(function_signature.len()));
        inner.update(function_signature.as_bytes());
        Self { inner }
    }

    /// Append an address argument
    pub fn address(mut self, value: Address) -> Self {
        self.inner.update(&[TAG_ADDRESS]);
        self.inner.update(value.as_bytes());
        self
    }

    /// Append an amount argument
    pub fn amount(mut self, value: TokenAmount) -> Self {
        self.inner.update(&[TAG_AMOUNT]);
        self.inner.update(&value.units().to_be_bytes());
        self
    }

    /// Append an integer argument
    pub fn u64(mut self, value: u64) -> Self {
        self.inner.update(&[TAG_U64]);
        self.inner.update(&value.to_be_bytes());
        self
    }

    /// Append a bytes argument
    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.inner.update(&[TAG_BYTES]);
        self.inner.update(&len_prefix(value.len()));
        self.inner.update(value);
        self
    }

    /// Append a text argument
    pub fn string(mut self, value: &str) -> Self {
        self.inner.update(&[TAG_STRING]);
        self.inner.update(&len_prefix(value.len()));
        self.inner.update(value.as_bytes());
        self
    }

    /// Append any typed argument
    pub fn arg(self, arg: &ActionArg) -> Self {
        match arg {
            ActionArg::Address(a) => self.address(*a),
            ActionArg::Amount(a) => self.amount(*a),
            ActionArg::U64(v) => self.u64(*v),
            ActionArg::Bytes(b) => self.bytes(b),
            ActionArg::Str(s) => self.string(s),
        }
    }

    /// Finish with the caller-chosen nonce
    pub fn finish(mut self, nonce: u64) -> Hash32 {
        self.inner.update(&[TAG_NONCE]);
        self.inner.update(&nonce.to_be_bytes());
        Hash32(self.inner.finalize())
    }
}

/// Hash a privileged call. Pure: the same inputs always give the same hash.
pub fn compute_action_hash(
    domain: &DomainSeparator,
    function_signature: &str,
    args: &[ActionArg],
    nonce: u64,
) -> Hash32 {
    args.iter()
        .fold(ActionEncoder::new(domain, function_signature), |enc, arg| {
            enc.arg(arg)
        })
        .finish(nonce)
}

/// Wrap an action hash in the signed-message envelope owners sign
pub fn hash_to_sign(action_hash: &Hash32) -> Hash32 {
    let mut h = hasher();
    h.update(SIGNED_MESSAGE_PREFIX);
    h.update(action_hash.as_bytes());
    Hash32(h.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> DomainSeparator {
        DomainSeparator::new("ActivityReward", Address::from_label("reward-desk"))
    }

    fn user() -> Address {
        Address::from_label("user")
    }

    #[test]
    fn test_builder_matches_arg_list() {
        let built = ActionEncoder::new(&domain(), "getFreeReward(address,uint256)")
            .address(user())
            .finish(0);
        let listed = compute_action_hash(
            &domain(),
            "getFreeReward(address,uint256)",
            &[ActionArg::Address(user())],
            0,
        );
        assert_eq!(built, listed);
    }

    #[test]
    fn test_every_component_is_bound() {
        let sig = "injectReleaseReward(address,uint256,uint256)";
        let amount = TokenAmount::ONE_TOKEN;
        let base = compute_action_hash(
            &domain(),
            sig,
            &[ActionArg::Address(user()), ActionArg::Amount(amount)],
            7,
        );
        let other_domain = DomainSeparator::new("ActivityReward", Address::from_label("elsewhere"));
        let variants = [
            compute_action_hash(
                &other_domain,
                sig,
                &[ActionArg::Address(user()), ActionArg::Amount(amount)],
                7,
            ),
            compute_action_hash(
                &domain(),
                "withdraw(address,uint256,uint256)",
                &[ActionArg::Address(user()), ActionArg::Amount(amount)],
                7,
            ),
            compute_action_hash(
                &domain(),
                sig,
                &[
                    ActionArg::Address(Address::from_label("other")),
                    ActionArg::Amount(amount),
                ],
                7,
            ),
            compute_action_hash(
                &domain(),
                sig,
                &[ActionArg::Address(user()), ActionArg::Amount(TokenAmount::ZERO)],
                7,
            ),
            compute_action_hash(
                &domain(),
                sig,
                &[ActionArg::Address(user()), ActionArg::Amount(amount)],
                8,
            ),
        ];
        for v in variants {
            assert_ne!(v, base);
        }
    }

    #[test]
    fn test_length_prefix_prevents_concatenation_collision() {
        let a = compute_action_hash(
            &domain(),
            "f",
            &[ActionArg::Str("ab".into()), ActionArg::Str("c".into())],
            0,
        );
        let b = compute_action_hash(
            &domain(),
            "f",
            &[ActionArg::Str("a".into()), ActionArg::Str("bc".into())],
            0,
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_signed_hash_differs_from_action_hash() {
        let action = compute_action_hash(&domain(), "f", &[], 0);
        let signed = hash_to_sign(&action);
        assert_ne!(action, signed);
        assert_eq!(signed, hash_to_sign(&action));
    }
}
