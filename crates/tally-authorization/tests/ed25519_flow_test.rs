//! End-to-end approval flows with real Ed25519 owner keys

#![allow(clippy::expect_used)]

use assert_matches::assert_matches;
use tally_authorization::{ActionArg, AuthorizationEvent, OwnerSet, QuorumLedger};
use tally_core::{Address, AuthorizationConfig, TallyError, TokenAmount};
use tally_effects::Ed25519Verifier;
use tally_testkit::{init_test_tracing, tokens, KeyTestFixture};

const MINT: &str = "mint(address,uint256,uint256)";

struct Setup {
    ledger: QuorumLedger<Ed25519Verifier>,
    owners: Vec<KeyTestFixture>,
}

fn setup(n: usize, threshold: usize) -> Setup {
    init_test_tracing();
    let owners: Vec<_> = (0..n)
        .map(|i| KeyTestFixture::from_seed_string(&format!("administrator-{i}")))
        .collect();
    let config = AuthorizationConfig {
        name: "Token".to_string(),
        ledger_account: Address::from_label("token"),
        owners: owners.iter().map(KeyTestFixture::address).collect(),
        threshold,
    };
    Setup {
        ledger: QuorumLedger::from_config(&config, Ed25519Verifier).expect("ledger"),
        owners,
    }
}

fn mint_args(to: Address, amount: TokenAmount) -> Vec<ActionArg> {
    vec![ActionArg::Address(to), ActionArg::Amount(amount)]
}

#[test]
fn inline_mint_with_two_of_three() {
    let s = setup(3, 2);
    let to = Address::from_label("receiver");
    let hash = s.ledger.signed_hash(MINT, &mint_args(to, tokens("100")), 0);

    let sigs = [s.owners[0].sign(&hash), s.owners[1].sign(&hash)];
    s.ledger
        .authorize_now(s.owners[2].address(), hash, &sigs)
        .expect("authorized");

    // The next mint needs a fresh nonce; old signatures no longer match.
    let next = s.ledger.signed_hash(MINT, &mint_args(to, tokens("100")), 1);
    assert_matches!(
        s.ledger.authorize_now(Address::from_label("anyone"), next, &sigs),
        Err(TallyError::UnknownSigner { .. })
    );
}

#[test]
fn insufficient_and_duplicate_self_signature() {
    let s = setup(3, 2);
    let hash = s
        .ledger
        .signed_hash(MINT, &mint_args(Address::from_label("r"), tokens("1")), 0);
    let caller = s.owners[0].address();

    assert_matches!(
        s.ledger.add_approval(caller, hash, &[s.owners[0].sign(&hash)]),
        Err(TallyError::InsufficientSignatures { have: 1, need: 2 })
    );
    assert_matches!(
        s.ledger.add_approval(
            caller,
            hash,
            &[s.owners[0].sign(&hash), s.owners[0].sign(&hash)]
        ),
        Err(TallyError::InsufficientSignatures { .. })
    );
    s.ledger
        .add_approval(caller, hash, &[s.owners[1].sign(&hash)])
        .expect("caller plus one co-signer");
}

#[test]
fn stranger_signature_is_rejected() {
    let s = setup(3, 2);
    let hash = s
        .ledger
        .signed_hash(MINT, &mint_args(Address::from_label("r"), tokens("1")), 0);
    let stranger = KeyTestFixture::from_seed_string("stranger");
    let sigs = [
        s.owners[0].sign(&hash),
        s.owners[1].sign(&hash),
        stranger.sign(&hash),
    ];
    let err = s
        .ledger
        .add_approval(Address::from_label("anyone"), hash, &sigs)
        .expect_err("stranger");
    assert_eq!(err.code(), "UNKNOWN_SIGNER");
    assert_eq!(err.to_string(), format!("signer is not owner: {}", stranger.address()));
}

#[test]
fn transfer_ownership_hands_over_signing_power() {
    let s = setup(2, 2);
    let successor = KeyTestFixture::from_seed_string("successor");
    s.ledger
        .transfer_ownership(s.owners[0].address(), successor.address())
        .expect("transfer");
    assert_eq!(
        s.ledger.events().last(),
        Some(&AuthorizationEvent::OwnershipTransferred {
            previous: s.owners[0].address(),
            new: successor.address(),
        })
    );

    let hash = s.ledger.signed_hash("f()", &[], 0);
    assert_matches!(
        s.ledger.add_approval(
            Address::from_label("anyone"),
            hash,
            &[s.owners[0].sign(&hash), s.owners[1].sign(&hash)]
        ),
        Err(TallyError::UnknownSigner { .. })
    );
    s.ledger
        .add_approval(
            Address::from_label("anyone"),
            hash,
            &[successor.sign(&hash), s.owners[1].sign(&hash)],
        )
        .expect("successor signs");
}

#[test]
fn owner_set_round_trips_through_json() {
    let s = setup(3, 2);
    let set = OwnerSet::new(s.ledger.owners(), s.ledger.threshold()).expect("set");
    let json = serde_json::to_string(&set).expect("serialize");
    let back: OwnerSet = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, set);
}
