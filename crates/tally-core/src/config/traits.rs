//! Core configuration trait

use crate::{Result, TallyError};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TALLY_";

/// Configuration loaded from TOML and overridden by `TALLY_*` variables
pub trait LedgerConfig: Clone + Default + DeserializeOwned + Send + Sync + 'static {
    /// Parse from TOML text. Missing sections take their defaults.
    fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TallyError::invalid(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from `(KEY, VALUE)` pairs. Keys carry the
    /// [`ENV_PREFIX`]; pairs without it are ignored.
    fn merge_with_env_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>;

    /// Apply overrides from the process environment
    fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_env_vars(std::env::vars())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()>;
}
