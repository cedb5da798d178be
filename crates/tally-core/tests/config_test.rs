//! Configuration file loading tests

#![allow(clippy::expect_used)]

use assert_matches::assert_matches;
use std::io::Write;
use tally_core::{Address, LedgerConfig, TallyConfig, TallyError, TokenAmount};

fn owner(i: u8) -> Address {
    Address::from_label(&format!("owner-{i}"))
}

#[test]
fn test_load_from_file_with_partial_sections() {
    let text = format!(
        r#"
[authorization]
name = "ActivityReward"
threshold = 2
owners = ["{}", "{}"]

[release]
min_release_chunk = "5"
activity_window = {{ start = 100, end = 200 }}
"#,
        owner(0),
        owner(1)
    );
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(text.as_bytes()).expect("write config");

    let cfg = TallyConfig::load_from_file(file.path()).expect("load config");
    assert_eq!(cfg.authorization.name, "ActivityReward");
    assert_eq!(cfg.authorization.owners, vec![owner(0), owner(1)]);
    assert_eq!(cfg.release.period_secs, 2_592_000);
    assert_eq!(
        cfg.release.min_release_chunk,
        TokenAmount::from_tokens(5).expect("amount")
    );
    assert_eq!(cfg.release.activity_window.map(|w| w.end), Some(200));
    assert_eq!(cfg.rewards.free_reward.to_string(), "0.5");
    cfg.validate().expect("valid config");
}

#[test]
fn test_missing_file_is_invalid() {
    let err = TallyConfig::load_from_file(std::path::Path::new("/nonexistent/tally.toml"))
        .expect_err("missing file");
    assert_matches!(err, TallyError::Invalid { .. });
}

#[test]
fn test_bad_owner_address_rejected() {
    let err = TallyConfig::from_toml_str("[authorization]\nowners = [\"0x12\"]\n")
        .expect_err("short address");
    assert_eq!(err.code(), "INVALID");
}

#[test]
fn test_inverted_window_fails_validation() {
    let mut cfg = TallyConfig::from_toml_str(&format!(
        "[authorization]\nowners = [\"{}\"]\n[release]\nactivity_window = {{ start = 10, end = 5 }}\n",
        owner(0)
    ))
    .expect("parse");
    assert!(cfg.validate().is_err());
    cfg.release.activity_window = None;
    cfg.validate().expect("valid once window removed");
}
