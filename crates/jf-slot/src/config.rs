//! Slot engine configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::ledger::BetLimits;
use crate::paytable::{PayTable, Payouts};
use crate::symbols::Symbol;
use crate::timing::TimingConfig;

/// Complete slot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Balance of a fresh (or reset) session
    pub initial_credits: u64,
    /// Bet of a fresh (or reset) session
    pub initial_bet: u64,
    /// Bet bounds
    pub bet_limits: BetLimits,
    /// Win multipliers
    pub payouts: Payouts,
    /// Symbol whose three-of-a-kind pays the jackpot
    pub jackpot_symbol: Symbol,
    /// Reel animation timing (used by timed presenters)
    pub timing: TimingConfig,
    /// Give up waiting for reel stop signals after this long and settle
    /// anyway. `None` waits forever.
    pub reel_timeout_ms: Option<u64>,
    /// Persistence key; bump the suffix to abandon old saves
    pub storage_key: String,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            initial_credits: 100,
            initial_bet: 1,
            bet_limits: BetLimits::default(),
            payouts: Payouts::default(),
            jackpot_symbol: Symbol::CircusTent,
            timing: TimingConfig::default(),
            reel_timeout_ms: None,
            storage_key: jf_state::DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl SlotConfig {
    /// Headless config: instant reels, everything else default
    pub fn instant() -> Self {
        Self {
            timing: TimingConfig::instant(),
            ..Self::default()
        }
    }

    /// Paytable for this config
    pub fn paytable(&self) -> PayTable {
        PayTable::new(self.payouts, self.jackpot_symbol)
    }

    /// Reel timeout, if any
    pub fn reel_timeout(&self) -> Option<Duration> {
        self.reel_timeout_ms.map(Duration::from_millis)
    }

    /// Check the config is playable
    pub fn validate(&self) -> SlotResult<()> {
        let limits = &self.bet_limits;
        if limits.min == 0 {
            return Err(SlotError::InvalidConfig("minimum bet must be at least 1".into()));
        }
        if limits.min > limits.max {
            return Err(SlotError::InvalidConfig(format!(
                "minimum bet {} exceeds maximum bet {}",
                limits.min, limits.max
            )));
        }
        if self.timing.spin_min_ms > self.timing.spin_max_ms {
            return Err(SlotError::InvalidConfig(format!(
                "spin_min_ms {} exceeds spin_max_ms {}",
                self.timing.spin_min_ms, self.timing.spin_max_ms
            )));
        }
        if self.storage_key.trim().is_empty() {
            return Err(SlotError::InvalidConfig("storage key is empty".into()));
        }
        Ok(())
    }

    /// Parse YAML
    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load_from<P: AsRef<Path>>(path: P) -> SlotResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            other => Err(SlotError::InvalidConfig(format!(
                "unsupported config extension: {:?}",
                other
            ))),
        }
    }

    /// Export config as JSON
    pub fn to_json(&self) -> SlotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
