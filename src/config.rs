//! Dashboard configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file is valid.
//!
//! ```toml
//! frame_rate = 30
//! base_token = "ETH"
//! governance_token = "GEN"
//! member_page = 1000
//! poll_interval_ms = 1000
//!
//! [[tokens]]
//! address = "0x543ff227f64aa17ea132bf9886cab5db55dcaddf"
//! symbol = "GEN"
//! decimals = 18
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::ledger::Address;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A token whose balance the header shows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenInfo {
    pub address: String,
    pub symbol: String,
    pub decimals: u32,
}

impl TokenInfo {
    #[must_use]
    pub fn address(&self) -> Address {
        Address::new(self.address.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Frames drawn per second.
    pub frame_rate: u32,
    /// Symbol of the chain's native currency.
    pub base_token: String,
    /// Symbol of the governance token, shown even with a zero balance.
    pub governance_token: String,
    /// Members fetched to warm the ledger before token balances are queried.
    pub member_page: usize,
    /// How often ledger queries refresh, in milliseconds.
    pub poll_interval_ms: u64,
    pub tokens: Vec<TokenInfo>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            base_token: "ETH".to_string(),
            governance_token: "GEN".to_string(),
            member_page: 1000,
            poll_interval_ms: 1000,
            tokens: vec![TokenInfo {
                address: "0x543ff227f64aa17ea132bf9886cab5db55dcaddf".to_string(),
                symbol: "GEN".to_string(),
                decimals: 18,
            }],
        }
    }
}

impl DashboardConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for values out of range.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == 0 {
            return Err(ConfigError::Invalid("frame_rate must be at least 1".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be at least 1".into()));
        }
        if let Some(token) = self.tokens.iter().find(|token| token.decimals > 38) {
            return Err(ConfigError::Invalid(format!(
                "token {} has {} decimals, at most 38 are supported",
                token.symbol, token.decimals
            )));
        }
        Ok(())
    }
}
