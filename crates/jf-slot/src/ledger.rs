//! Economy ledger: credits, bet and cumulative statistics
//!
//! Invariants held after every operation:
//! - `credits` never goes negative (unsigned, and `deduct` refuses overdrafts)
//! - `limits.min <= bet <= limits.ceiling(credits)`
//! - statistics only ever grow

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Configured bet bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetLimits {
    pub min: u64,
    pub max: u64,
}

impl Default for BetLimits {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

impl BetLimits {
    /// Highest bet allowed with `credits` on the balance:
    /// `min(max, max(credits, 1))`, never below `min`.
    pub fn ceiling(&self, credits: u64) -> u64 {
        self.max.min(credits.max(1)).max(self.min)
    }

    /// Clamp `bet` into `[min, ceiling(credits)]`
    pub fn clamp(&self, bet: u64, credits: u64) -> u64 {
        bet.clamp(self.min, self.ceiling(credits))
    }
}

/// Cumulative session statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_wins: u64,
    pub biggest_win: u64,
}

impl SessionStats {
    /// Percentage of spins that paid out
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.total_wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Result of a bet change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BetChange {
    /// The clamped value equals the current bet; nothing to show
    Unchanged { bet: u64 },
    Changed { old: u64, new: u64 },
}

impl BetChange {
    /// Bet after the request
    pub fn bet(&self) -> u64 {
        match *self {
            Self::Unchanged { bet } => bet,
            Self::Changed { new, .. } => new,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Credits, bet and statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EconomyLedger {
    credits: u64,
    bet: u64,
    limits: BetLimits,
    stats: SessionStats,
}

impl EconomyLedger {
    /// Fresh ledger. The bet is clamped into bounds.
    pub fn new(credits: u64, bet: u64, limits: BetLimits) -> Self {
        Self::restore(credits, bet, SessionStats::default(), limits)
    }

    /// Rebuild from persisted values, clamping anything out of bounds
    pub fn restore(credits: u64, bet: u64, stats: SessionStats, limits: BetLimits) -> Self {
        let clamped = limits.clamp(bet, credits);
        if clamped != bet {
            log::debug!("[Ledger] Restored bet {} clamped to {}", bet, clamped);
        }
        Self {
            credits,
            bet: clamped,
            limits,
            stats: SessionStats {
                total_wins: stats.total_wins.min(stats.total_spins),
                ..stats
            },
        }
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    pub fn limits(&self) -> BetLimits {
        self.limits
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Can the balance cover `bet`?
    pub fn can_afford_spin(&self, bet: u64) -> bool {
        self.credits >= bet
    }

    /// Take `bet` off the balance
    pub fn deduct(&mut self, bet: u64) -> SlotResult<()> {
        if !self.can_afford_spin(bet) {
            return Err(SlotError::InsufficientCredits {
                credits: self.credits,
                bet,
            });
        }
        self.credits -= bet;
        self.reclamp_bet();
        Ok(())
    }

    /// Add a payout to the balance
    pub fn award(&mut self, amount: u64) {
        self.credits = self.credits.saturating_add(amount);
        self.reclamp_bet();
    }

    /// Request a new bet. Out-of-range values are clamped, not rejected.
    pub fn set_bet(&mut self, requested: u64) -> BetChange {
        let clamped = self.limits.clamp(requested, self.credits);
        if clamped == self.bet {
            return BetChange::Unchanged { bet: self.bet };
        }
        let old = self.bet;
        self.bet = clamped;
        BetChange::Changed { old, new: clamped }
    }

    /// Adjust the bet by `delta`
    pub fn change_bet(&mut self, delta: i64) -> BetChange {
        let requested = if delta >= 0 {
            self.bet.saturating_add(delta as u64)
        } else {
            self.bet.saturating_sub(delta.unsigned_abs())
        };
        self.set_bet(requested)
    }

    /// Count a settled spin
    pub fn record_spin(&mut self, won: bool, amount: u64) {
        self.stats.total_spins = self.stats.total_spins.saturating_add(1);
        if won {
            self.stats.total_wins = self.stats.total_wins.saturating_add(1);
            self.stats.biggest_win = self.stats.biggest_win.max(amount);
        }
    }

    /// Add credits outside of a spin
    pub fn grant_credits(&mut self, amount: u64) {
        self.award(amount);
    }

    /// Overwrite the balance outside of a spin
    pub fn set_credits(&mut self, value: u64) {
        self.credits = value;
        self.reclamp_bet();
    }

    /// Put balance and bet back to starting values. Statistics are kept.
    pub fn reset(&mut self, credits: u64, bet: u64) {
        self.credits = credits;
        self.bet = self.limits.clamp(bet, credits);
    }

    fn reclamp_bet(&mut self) {
        self.bet = self.limits.clamp(self.bet, self.credits);
    }
}
