//! Ledger configuration
//!
//! ```toml
//! [authorization]
//! name = "ActivityReward"
//! threshold = 2
//! owners = ["0x…", "0x…"]
//!
//! [release]
//! instant_release_bps = 500
//! period_release_bps = 1000
//! min_release_chunk = "5"
//! period_secs = 2592000
//! projection_periods = 100
//!
//! [rewards]
//! free_reward = "0.5"
//! entry_fee = "1"
//! multipliers_bps = [0, 5000, 10000, 18000, 30000]
//!
//! [deposits]
//! spend_cost = "10"
//! ```
//!
//! Every field can be overridden from the environment with
//! `TALLY_<SECTION>_<FIELD>` (e.g. `TALLY_AUTHORIZATION_THRESHOLD=3`).
//! Lists are comma separated.

mod traits;
mod validation;

pub use traits::{LedgerConfig, ENV_PREFIX};
pub use validation::{ConfigValidator, ValidationError, ValidationResult};

use crate::identifiers::Address;
use crate::types::{TokenAmount, BPS_DENOMINATOR};
use crate::{Result, TallyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Seconds in one release period (30 days)
pub const SECONDS_PER_PERIOD: u64 = 30 * 24 * 60 * 60;

/// Owner set and domain of the quorum authorization ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Ledger name bound into every action hash
    pub name: String,
    /// The ledger's own account, bound into every action hash
    pub ledger_account: Address,
    /// Ordered owner addresses
    pub owners: Vec<Address>,
    /// Distinct owner signatures required
    pub threshold: usize,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            name: "tally".to_string(),
            ledger_account: Address::from_label("tally.ledger"),
            owners: Vec::new(),
            threshold: 1,
        }
    }
}

/// Inclusive time window during which injections are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityWindow {
    /// First accepted second
    pub start: u64,
    /// Last accepted second
    pub end: u64,
}

impl ActivityWindow {
    /// True when `now` lies inside the window
    pub fn contains(&self, now: u64) -> bool {
        self.start <= now && now <= self.end
    }
}

/// Monthly release policy and accounts of the vesting ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    /// Share of each injection released immediately
    pub instant_release_bps: u32,
    /// Share of the scheduled principal released per elapsed period
    pub period_release_bps: u32,
    /// Smallest chunk a period releases while principal remains
    pub min_release_chunk: TokenAmount,
    /// Period length in seconds
    pub period_secs: u64,
    /// Number of periods returned by release projections
    pub projection_periods: u32,
    /// Optional injection window
    pub activity_window: Option<ActivityWindow>,
    /// Account holding injected tokens until release
    pub custody: Address,
    /// Account injections are pulled from
    pub treasury: Address,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            instant_release_bps: 500,
            period_release_bps: 1_000,
            min_release_chunk: TokenAmount::from_units(5 * TokenAmount::ONE_TOKEN.units()),
            period_secs: SECONDS_PER_PERIOD,
            projection_periods: 100,
            activity_window: None,
            custody: Address::from_label("tally.release.custody"),
            treasury: Address::from_label("tally.release.treasury"),
        }
    }
}

/// Amounts paid by the reward desk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Amount paid by one free-reward claim
    pub free_reward: TokenAmount,
    /// Stake collected for one multiple-reward draw
    pub entry_fee: TokenAmount,
    /// Prize multipliers in bps of the entry fee, indexed by random word
    pub multipliers_bps: Vec<u32>,
    /// Account rewards are paid from
    pub spender: Address,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            free_reward: TokenAmount::from_units(TokenAmount::ONE_TOKEN.units() / 2),
            entry_fee: TokenAmount::ONE_TOKEN,
            multipliers_bps: vec![0, 5_000, 10_000, 18_000, 30_000],
            spender: Address::from_label("tally.rewards.spender"),
        }
    }
}

/// Prepaid deposit accounts spent by gated calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepositConfig {
    /// Charged against the caller's deposit by one gated spend
    pub spend_cost: TokenAmount,
    /// Account holding deposited tokens
    pub vault: Address,
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            spend_cost: TokenAmount::from_units(10 * TokenAmount::ONE_TOKEN.units()),
            vault: Address::from_label("tally.deposits.vault"),
        }
    }
}

/// Complete workspace configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Quorum authorization ledger
    pub authorization: AuthorizationConfig,
    /// Vesting ledger
    pub release: ReleaseConfig,
    /// Reward desk
    pub rewards: RewardConfig,
    /// Deposit ledger
    pub deposits: DepositConfig,
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| TallyError::invalid(format!("{key}: {e}")))
}

fn parse_env_list<T>(key: &str, value: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| parse_env(key, part))
        .collect()
}

impl LedgerConfig for TallyConfig {
    fn merge_with_env_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "AUTHORIZATION_NAME" => self.authorization.name = value,
                "AUTHORIZATION_LEDGER_ACCOUNT" => {
                    self.authorization.ledger_account = parse_env(&key, &value)?;
                }
                "AUTHORIZATION_OWNERS" => self.authorization.owners = parse_env_list(&key, &value)?,
                "AUTHORIZATION_THRESHOLD" => self.authorization.threshold = parse_env(&key, &value)?,
                "RELEASE_INSTANT_RELEASE_BPS" => {
                    self.release.instant_release_bps = parse_env(&key, &value)?;
                }
                "RELEASE_PERIOD_RELEASE_BPS" => {
                    self.release.period_release_bps = parse_env(&key, &value)?;
                }
                "RELEASE_MIN_RELEASE_CHUNK" => {
                    self.release.min_release_chunk = parse_env(&key, &value)?;
                }
                "RELEASE_PERIOD_SECS" => self.release.period_secs = parse_env(&key, &value)?,
                "RELEASE_PROJECTION_PERIODS" => {
                    self.release.projection_periods = parse_env(&key, &value)?;
                }
                "RELEASE_CUSTODY" => self.release.custody = parse_env(&key, &value)?,
                "RELEASE_TREASURY" => self.release.treasury = parse_env(&key, &value)?,
                "REWARDS_FREE_REWARD" => self.rewards.free_reward = parse_env(&key, &value)?,
                "REWARDS_ENTRY_FEE" => self.rewards.entry_fee = parse_env(&key, &value)?,
                "REWARDS_MULTIPLIERS_BPS" => {
                    self.rewards.multipliers_bps = parse_env_list(&key, &value)?;
                }
                "REWARDS_SPENDER" => self.rewards.spender = parse_env(&key, &value)?,
                "DEPOSITS_SPEND_COST" => self.deposits.spend_cost = parse_env(&key, &value)?,
                "DEPOSITS_VAULT" => self.deposits.vault = parse_env(&key, &value)?,
                _ => tracing::debug!(key = %key, "ignoring unknown configuration override"),
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let root = ConfigValidator::new();

        let auth = &self.authorization;
        let mut v = root.for_field("authorization");
        v.custom("name", &auth.name, |n| !n.is_empty(), "must not be empty");
        v.range(
            "threshold",
            auth.threshold as u64,
            Some(1),
            Some(auth.owners.len() as u64),
        );
        v.custom(
            "owners",
            &auth.owners,
            |owners| owners.iter().collect::<BTreeSet<_>>().len() == owners.len(),
            "owners must be distinct",
        );
        v.custom(
            "owners",
            &auth.owners,
            |owners| !owners.contains(&Address::ZERO),
            "zero address cannot be an owner",
        );

        let release = &self.release;
        let mut r = root.for_field("release");
        let max_bps = BPS_DENOMINATOR as u32;
        r.range("instant_release_bps", release.instant_release_bps, None, Some(max_bps));
        r.range("period_release_bps", release.period_release_bps, Some(1), Some(max_bps));
        r.range("period_secs", release.period_secs, Some(1), None);
        r.range("projection_periods", release.projection_periods, Some(1), None);
        r.custom(
            "activity_window",
            &release.activity_window,
            |w| w.map_or(true, |w| w.start <= w.end),
            "start must not be after end",
        );
        r.custom(
            "custody",
            &release.custody,
            |c| *c != release.treasury,
            "custody and treasury must differ",
        );

        let rewards = &self.rewards;
        let mut w = root.for_field("rewards");
        w.custom(
            "multipliers_bps",
            &rewards.multipliers_bps,
            |m| !m.is_empty(),
            "must not be empty",
        );

        let deposits = &self.deposits;
        let mut d = root.for_field("deposits");
        d.custom(
            "spend_cost",
            &deposits.spend_cost,
            |c| !c.is_zero(),
            "must be non-zero",
        );
        d.custom(
            "vault",
            &deposits.vault,
            |a| *a != release.custody && *a != release.treasury,
            "vault must not share a release account",
        );

        let mut all = root;
        all.merge(v);
        all.merge(r);
        all.merge(w);
        all.merge(d);
        all.result().map_err(Into::into)
    }
}
