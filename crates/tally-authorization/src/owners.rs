//! Owner set

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tally_core::{Address, AuthorizationConfig, Result, TallyError};

/// Ordered set of distinct owners and the number of them an approval needs.
///
/// Invariant: owners are distinct and `1 <= threshold <= owners.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSet {
    owners: Vec<Address>,
    threshold: usize,
}

impl OwnerSet {
    /// Build an owner set, rejecting duplicates and out-of-range thresholds
    pub fn new(owners: Vec<Address>, threshold: usize) -> Result<Self> {
        if owners.is_empty() {
            return Err(TallyError::invalid("owner set must not be empty"));
        }
        if threshold == 0 || threshold > owners.len() {
            return Err(TallyError::invalid(format!(
                "threshold {threshold} outside 1..={}",
                owners.len()
            )));
        }
        let distinct: BTreeSet<&Address> = owners.iter().collect();
        if distinct.len() != owners.len() {
            return Err(TallyError::invalid("owners must be distinct"));
        }
        if distinct.contains(&Address::ZERO) {
            return Err(TallyError::invalid("zero address cannot be an owner"));
        }
        Ok(Self { owners, threshold })
    }

    /// Owner set described by configuration
    pub fn from_config(config: &AuthorizationConfig) -> Result<Self> {
        Self::new(config.owners.clone(), config.threshold)
    }

    /// Owners in slot order
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// Required distinct signers
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// True when `address` holds an owner slot
    pub fn contains(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// Hand `current`'s slot to `replacement`. The slot keeps its position.
    pub(crate) fn replace(&mut self, current: Address, replacement: Address) -> Result<()> {
        if replacement == Address::ZERO {
            return Err(TallyError::invalid("zero address cannot be an owner"));
        }
        if self.contains(&replacement) {
            return Err(TallyError::invalid(format!("{replacement} is already an owner")));
        }
        let slot = self
            .owners
            .iter_mut()
            .find(|owner| **owner == current)
            .ok_or(TallyError::NotOwner { caller: current })?;
        *slot = replacement;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(i: u8) -> Address {
        Address::from_label(&format!("owner-{i}"))
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(OwnerSet::new(vec![owner(0), owner(1)], 0).is_err());
        assert!(OwnerSet::new(vec![owner(0), owner(1)], 3).is_err());
        assert!(OwnerSet::new(vec![], 1).is_err());
        assert!(OwnerSet::new(vec![owner(0), owner(1)], 2).is_ok());
    }

    #[test]
    fn test_duplicates_rejected() {
        assert!(OwnerSet::new(vec![owner(0), owner(0)], 1).is_err());
    }

    #[test]
    fn test_replace_keeps_slot_order() {
        let mut set = OwnerSet::new(vec![owner(0), owner(1), owner(2)], 2).unwrap_or_else(|e| panic!("{e}"));
        assert!(set.replace(owner(1), owner(9)).is_ok());
        assert_eq!(set.owners(), &[owner(0), owner(9), owner(2)]);
        assert!(set.replace(owner(1), owner(8)).is_err());
        assert!(set.replace(owner(0), owner(2)).is_err());
    }
}
