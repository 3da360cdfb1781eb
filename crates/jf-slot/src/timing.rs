//! Reel timing profiles
//!
//! Each reel stops after `spin_min + U(0, spin_max - spin_min) + reel * stagger`,
//! so later reels tend to land later but every reel draws its own jitter.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// No delay at all (headless runs, tests)
    Instant,
    /// Hand-tuned or scaled
    Custom,
}

impl TimingProfile {
    /// Parse a profile name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "turbo" | "fast" => Some(Self::Turbo),
            "instant" => Some(Self::Instant),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Reel animation timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub profile: TimingProfile,
    /// Shortest spin of a reel (ms)
    pub spin_min_ms: u64,
    /// Longest spin of a reel before stagger (ms)
    pub spin_max_ms: u64,
    /// Extra delay per reel index (ms)
    pub reel_stagger_ms: u64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            spin_min_ms: 1500,
            spin_max_ms: 3000,
            reel_stagger_ms: 200,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            spin_min_ms: 400,
            spin_max_ms: 800,
            reel_stagger_ms: 100,
        }
    }

    /// No delays
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            spin_min_ms: 0,
            spin_max_ms: 0,
            reel_stagger_ms: 0,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self {
                profile: TimingProfile::Custom,
                ..Self::normal()
            },
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let scale = |ms: u64| (ms as f64 * factor).round() as u64;
        Self {
            profile: TimingProfile::Custom,
            spin_min_ms: scale(self.spin_min_ms),
            spin_max_ms: scale(self.spin_max_ms),
            reel_stagger_ms: scale(self.reel_stagger_ms),
        }
    }

    /// Delay before `reel` stops, with `jitter` in `[0, 1]` picking a point
    /// in the min..max window
    pub fn reel_delay(&self, reel: usize, jitter: f64) -> Duration {
        let window = self.spin_max_ms.saturating_sub(self.spin_min_ms) as f64;
        let base = self.spin_min_ms as f64 + window * jitter.clamp(0.0, 1.0);
        let stagger = self.reel_stagger_ms as f64 * reel as f64;
        Duration::from_millis((base + stagger).round() as u64)
    }

    /// Upper bound on how long all `reel_count` reels take to stop
    pub fn longest_spin(&self, reel_count: usize) -> Duration {
        let last = reel_count.saturating_sub(1) as u64;
        Duration::from_millis(self.spin_min_ms.max(self.spin_max_ms) + last * self.reel_stagger_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}
