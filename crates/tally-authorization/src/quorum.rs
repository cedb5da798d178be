//! Quorum verification
//!
//! Counts the distinct owners that approved a signed hash. Each submitted
//! signature must come from an owner and verify over the signed hash; a
//! single bad signature rejects the whole submission rather than being
//! skipped. Repeated signatures from one owner count once, and an owner
//! submitting the approval counts as one signer without signing.

use crate::owners::OwnerSet;
use std::collections::BTreeSet;
use tally_core::effects::SignatureEffects;
use tally_core::{Address, Hash32, Result, SignerSignature, TallyError};

/// Verify that `signatures` (plus `caller`, when it is an owner) reach the
/// owner set's threshold for `signed_hash`.
///
/// # Returns
///
/// The distinct approving owners, or
/// - `UnknownSigner` if any signature is from a non-owner or fails to verify
/// - `InsufficientSignatures` if fewer distinct owners than the threshold
///   approved
pub fn verify_quorum<V>(
    verifier: &V,
    owners: &OwnerSet,
    caller: Address,
    signed_hash: &Hash32,
    signatures: &[SignerSignature],
) -> Result<BTreeSet<Address>>
where
    V: SignatureEffects + ?Sized,
{
    let mut approvers = BTreeSet::new();

    for sig in signatures {
        let signer = sig.signer();
        if !owners.contains(&signer) {
            tracing::warn!(signer = %signer, hash = %signed_hash, "signature from non-owner");
            return Err(TallyError::UnknownSigner { signer });
        }
        if !verifier.verify(&sig.public_key, signed_hash, &sig.signature) {
            tracing::warn!(signer = %signer, hash = %signed_hash, "signature does not verify");
            return Err(TallyError::UnknownSigner { signer });
        }
        approvers.insert(signer);
    }

    if owners.contains(&caller) {
        approvers.insert(caller);
    }

    let need = owners.threshold();
    if approvers.len() < need {
        tracing::warn!(
            have = approvers.len(),
            need,
            hash = %signed_hash,
            "quorum not reached"
        );
        return Err(TallyError::InsufficientSignatures {
            have: approvers.len(),
            need,
        });
    }

    tracing::debug!(
        signers = approvers.len(),
        min_required = need,
        hash = %signed_hash,
        "quorum verified"
    );
    Ok(approvers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tally_testkit::{FakeSigner, FakeVerifier};

    fn signers() -> Vec<FakeSigner> {
        (0..3).map(|i| FakeSigner::new(&format!("owner-{i}"))).collect()
    }

    fn owner_set(threshold: usize) -> OwnerSet {
        let owners = signers().iter().map(FakeSigner::address).collect();
        OwnerSet::new(owners, threshold).unwrap_or_else(|e| panic!("{e}"))
    }

    fn outsider() -> Address {
        Address::from_label("outsider")
    }

    #[test]
    fn test_two_of_three_reaches_quorum() {
        let hash = Hash32::digest(b"op");
        let s = signers();
        let sigs = [s[0].sign(&hash), s[2].sign(&hash)];
        let approvers = verify_quorum(&FakeVerifier, &owner_set(2), outsider(), &hash, &sigs);
        assert_eq!(approvers.map(|a| a.len()).ok(), Some(2));
    }

    #[test]
    fn test_duplicate_signatures_count_once() {
        let hash = Hash32::digest(b"op");
        let s = signers();
        let sigs = [s[0].sign(&hash), s[0].sign(&hash)];
        assert_matches!(
            verify_quorum(&FakeVerifier, &owner_set(2), outsider(), &hash, &sigs),
            Err(TallyError::InsufficientSignatures { have: 1, need: 2 })
        );
    }

    #[test]
    fn test_calling_owner_counts_once() {
        let hash = Hash32::digest(b"op");
        let s = signers();
        let caller = s[0].address();

        // Caller's own signature plus the implicit vote is still one signer.
        let sigs = [s[0].sign(&hash)];
        assert_matches!(
            verify_quorum(&FakeVerifier, &owner_set(2), caller, &hash, &sigs),
            Err(TallyError::InsufficientSignatures { have: 1, .. })
        );

        let sigs = [s[1].sign(&hash)];
        assert!(verify_quorum(&FakeVerifier, &owner_set(2), caller, &hash, &sigs).is_ok());
    }

    #[test]
    fn test_stranger_signature_rejects_submission() {
        let hash = Hash32::digest(b"op");
        let s = signers();
        let stranger = FakeSigner::new("stranger");
        let sigs = [s[0].sign(&hash), s[1].sign(&hash), stranger.sign(&hash)];
        assert_matches!(
            verify_quorum(&FakeVerifier, &owner_set(2), outsider(), &hash, &sigs),
            Err(TallyError::UnknownSigner { signer }) if signer == stranger.address()
        );
    }

    #[test]
    fn test_signature_over_other_hash_rejected() {
        let hash = Hash32::digest(b"op");
        let s = signers();
        let sigs = [s[0].sign(&Hash32::digest(b"stale"))];
        assert_matches!(
            verify_quorum(&FakeVerifier, &owner_set(1), outsider(), &hash, &sigs),
            Err(TallyError::UnknownSigner { .. })
        );
    }
}
