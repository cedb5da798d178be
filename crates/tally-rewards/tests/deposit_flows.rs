//! Deposit ledger flows through a 2-of-2 owner quorum with real Ed25519 keys

#![allow(clippy::expect_used)]

use assert_matches::assert_matches;
use std::sync::Arc;
use tally_authorization::{hash_to_sign, QuorumLedger};
use tally_core::effects::TokenEffects;
use tally_core::{Address, Hash32, LedgerConfig, TallyConfig, TallyError, TokenAmount};
use tally_effects::Ed25519Verifier;
use tally_rewards::{DepositEvent, DepositLedger};
use tally_testkit::{init_test_tracing, tokens, KeyTestFixture, MockToken};

struct World {
    deposits: DepositLedger<Ed25519Verifier, Arc<MockToken>>,
    admins: [KeyTestFixture; 2],
    token: Arc<MockToken>,
    config: TallyConfig,
}

impl World {
    fn new() -> Self {
        init_test_tracing();
        let admins = [
            KeyTestFixture::from_seed_string("administrator-1"),
            KeyTestFixture::from_seed_string("administrator-2"),
        ];
        let mut config = TallyConfig::from_toml_str(
            r#"
            [authorization]
            name = "Deposits"
            threshold = 2

            [deposits]
            spend_cost = "10"
            "#,
        )
        .expect("config");
        config.authorization.owners = admins.iter().map(KeyTestFixture::address).collect();
        config.validate().expect("valid config");

        let token = Arc::new(MockToken::new());
        token.mint(user(), tokens("1000"));
        token
            .approve(user(), config.authorization.ledger_account, tokens("1000"))
            .expect("approve");

        let authorization =
            QuorumLedger::from_config(&config.authorization, Ed25519Verifier).expect("ledger");
        let deposits = DepositLedger::new(
            Arc::new(authorization),
            Arc::clone(&token),
            config.deposits.clone(),
        )
        .expect("deposits");

        Self {
            deposits,
            admins,
            token,
            config,
        }
    }

    fn approve(&self, action_hash: Hash32) {
        let signed = hash_to_sign(&action_hash);
        let sigs: Vec<_> = self.admins.iter().map(|a| a.sign(&signed)).collect();
        self.deposits
            .authorization()
            .add_approval(self.admins[0].address(), signed, &sigs)
            .expect("approval");
    }

    fn is_pending(&self, action_hash: Hash32) -> bool {
        self.deposits
            .authorization()
            .is_pending(&hash_to_sign(&action_hash))
    }

    fn vault(&self) -> TokenAmount {
        self.token.balance_of(self.config.deposits.vault)
    }
}

fn user() -> Address {
    Address::from_label("user")
}

fn someone() -> Address {
    Address::from_label("someone")
}

#[test]
fn spend_requires_approval_and_charges_deposit_once() {
    let w = World::new();
    w.deposits.deposit(user(), tokens("20")).expect("deposit");
    assert_eq!(
        w.deposits.events(),
        vec![DepositEvent::Deposit {
            user: user(),
            amount: tokens("20"),
        }]
    );

    assert_matches!(
        w.deposits.spend(user(), 0),
        Err(TallyError::OperationNotPending { .. })
    );

    w.approve(w.deposits.spend_hash(user(), 0));
    assert_eq!(w.deposits.spend(user(), 0).expect("spend"), 0);
    assert_eq!(w.deposits.balance_of(user()), tokens("10"));
    assert_eq!(w.deposits.at_disposal(), tokens("10"));
    assert!(!w.is_pending(w.deposits.spend_hash(user(), 0)));

    assert_matches!(
        w.deposits.spend(user(), 0),
        Err(TallyError::OperationNotPending { .. })
    );
    assert_eq!(w.deposits.balance_of(user()), tokens("10"));

    w.approve(w.deposits.spend_hash(user(), 1));
    assert_eq!(w.deposits.spend(user(), 1).expect("spend"), 1);
    assert_eq!(w.deposits.balance_of(user()), TokenAmount::ZERO);
    assert_eq!(w.vault(), tokens("20"));
}

#[test]
fn short_deposit_is_rejected_before_approval_is_used() {
    let w = World::new();
    w.deposits
        .deposit_to(user(), someone(), tokens("20"))
        .expect("deposit");
    w.approve(w.deposits.spend_hash(someone(), 0));

    // the beneficiary's deposit does not pay for the caller
    assert_matches!(
        w.deposits.spend_to(user(), someone(), 0),
        Err(TallyError::InsufficientDeposits { .. })
    );
    assert!(w.is_pending(w.deposits.spend_hash(someone(), 0)));
    assert_eq!(w.deposits.at_disposal(), TokenAmount::ZERO);

    w.deposits.deposit(user(), tokens("20")).expect("deposit");
    assert_eq!(w.deposits.spend_to(user(), someone(), 0).expect("spend"), 0);
    assert_eq!(w.deposits.balance_of(user()), tokens("10"));
    assert_eq!(w.deposits.balance_of(someone()), tokens("20"));
    assert_eq!(
        w.deposits.events().last(),
        Some(&DepositEvent::Spent {
            payer: user(),
            beneficiary: someone(),
            sequence: 0,
            cost: tokens("10"),
        })
    );
}

#[test]
fn holders_withdraw_their_own_deposit() {
    let w = World::new();
    let (u1, u2) = (Address::from_label("u1"), Address::from_label("u2"));
    w.deposits.deposit_to(user(), u1, tokens("100")).expect("deposit");
    w.deposits.deposit_to(user(), u2, tokens("100")).expect("deposit");
    assert_eq!(w.token.balance_of(user()), tokens("800"));

    w.deposits.withdraw(u1, tokens("10")).expect("withdraw");
    assert_eq!(w.token.balance_of(u1), tokens("10"));
    assert_eq!(w.deposits.balance_of(u1), tokens("90"));

    w.deposits.withdraw_to(u1, u2, tokens("10")).expect("withdraw");
    assert_eq!(w.token.balance_of(u1), tokens("10"));
    assert_eq!(w.deposits.balance_of(u1), tokens("80"));
    assert_eq!(w.token.balance_of(u2), tokens("10"));
    assert_eq!(w.deposits.balance_of(u2), tokens("100"));

    assert_matches!(
        w.deposits.withdraw(u1, tokens("81")),
        Err(TallyError::InsufficientDeposits { .. })
    );
    assert_eq!(
        w.deposits.events().last(),
        Some(&DepositEvent::Withdraw {
            to: u2,
            amount: tokens("10"),
        })
    );
}

#[test]
fn rejected_withdrawal_keeps_deposit() {
    let w = World::new();
    w.deposits.deposit(user(), tokens("20")).expect("deposit");
    w.token.reject_transfers_to(user(), true);

    assert_matches!(
        w.deposits.withdraw(user(), tokens("5")),
        Err(TallyError::Token { .. })
    );
    assert_eq!(w.deposits.balance_of(user()), tokens("20"));
    assert_eq!(w.vault(), tokens("20"));
    assert_eq!(w.deposits.events().len(), 1);
}

#[test]
fn refund_returns_part_of_a_deposit() {
    let w = World::new();
    let u1 = Address::from_label("u1");
    w.deposits.deposit_to(user(), u1, tokens("100")).expect("deposit");

    assert_matches!(
        w.deposits.refund(u1, tokens("10"), 0),
        Err(TallyError::OperationNotPending { .. })
    );

    w.approve(w.deposits.refund_hash(u1, tokens("10"), 0));
    w.deposits.refund(u1, tokens("10"), 0).expect("refund");
    assert_eq!(w.token.balance_of(u1), tokens("10"));
    assert_eq!(w.deposits.balance_of(u1), tokens("90"));
    assert_eq!(
        w.deposits.events().last(),
        Some(&DepositEvent::Refund {
            to: u1,
            amount: tokens("10"),
            at_disposal: false,
        })
    );

    assert_matches!(
        w.deposits.refund(u1, tokens("10"), 0),
        Err(TallyError::OperationNotPending { .. })
    );
    assert_eq!(w.deposits.balance_of(u1), tokens("90"));
}

#[test]
fn refund_at_disposal_pays_out_spent_deposits() {
    let w = World::new();
    let admin = w.admins[0].address();
    w.deposits.deposit(user(), tokens("20")).expect("deposit");
    for nonce in 1..=2 {
        w.approve(w.deposits.spend_hash(user(), nonce));
        w.deposits.spend(user(), nonce).expect("spend");
    }
    assert_eq!(w.deposits.at_disposal(), tokens("20"));

    assert_matches!(
        w.deposits.refund_at_disposal(admin, tokens("50"), 3),
        Err(TallyError::OperationNotPending { .. })
    );
    w.approve(w.deposits.refund_at_disposal_hash(admin, tokens("50"), 3));
    assert_matches!(
        w.deposits.refund_at_disposal(admin, tokens("50"), 3),
        Err(TallyError::InsufficientDeposits { .. })
    );
    assert!(w.is_pending(w.deposits.refund_at_disposal_hash(admin, tokens("50"), 3)));

    assert_matches!(
        w.deposits.refund_at_disposal(admin, tokens("20"), 4),
        Err(TallyError::OperationNotPending { .. })
    );
    w.approve(w.deposits.refund_at_disposal_hash(admin, tokens("20"), 4));
    w.deposits
        .refund_at_disposal(admin, tokens("20"), 4)
        .expect("refund at disposal");
    assert_eq!(w.token.balance_of(admin), tokens("20"));
    assert_eq!(w.deposits.at_disposal(), TokenAmount::ZERO);
    assert_eq!(w.vault(), TokenAmount::ZERO);
    assert_eq!(
        w.deposits.events().last(),
        Some(&DepositEvent::Refund {
            to: admin,
            amount: tokens("20"),
            at_disposal: true,
        })
    );

    assert_matches!(
        w.deposits.refund_at_disposal(admin, tokens("20"), 4),
        Err(TallyError::OperationNotPending { .. })
    );
}
