//! Paytable and win evaluation

use serde::{Deserialize, Serialize};

use crate::symbols::{SpinOutcome, Symbol};

/// Reel pairs checked for a two-of-a-kind, in priority order
const PAIR_ORDER: [(usize, usize); 3] = [(0, 1), (1, 2), (0, 2)];

/// Win classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinKind {
    None,
    TwoOfKind,
    ThreeOfKind,
    Jackpot,
}

impl WinKind {
    pub fn is_win(self) -> bool {
        self != Self::None
    }
}

/// Bet multipliers per win kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payouts {
    pub two_of_kind: u64,
    pub three_of_kind: u64,
    pub jackpot: u64,
}

impl Default for Payouts {
    fn default() -> Self {
        Self {
            two_of_kind: 5,
            three_of_kind: 10,
            jackpot: 50,
        }
    }
}

impl Payouts {
    /// Multiplier for a win kind
    pub fn multiplier(&self, kind: WinKind) -> u64 {
        match kind {
            WinKind::None => 0,
            WinKind::TwoOfKind => self.two_of_kind,
            WinKind::ThreeOfKind => self.three_of_kind,
            WinKind::Jackpot => self.jackpot,
        }
    }
}

/// Evaluated spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinResult {
    pub kind: WinKind,
    pub multiplier: u64,
    /// `bet * multiplier`
    pub amount: u64,
    /// Reels to highlight, ascending
    pub winning_reels: Vec<usize>,
}

impl WinResult {
    /// Losing result
    pub fn none() -> Self {
        Self {
            kind: WinKind::None,
            multiplier: 0,
            amount: 0,
            winning_reels: Vec::new(),
        }
    }

    /// Check if this is a winning spin
    pub fn is_win(&self) -> bool {
        self.amount > 0
    }
}

/// Three-reel paytable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayTable {
    pub payouts: Payouts,
    /// Symbol whose three-of-a-kind pays the jackpot
    pub jackpot_symbol: Symbol,
}

impl PayTable {
    pub fn new(payouts: Payouts, jackpot_symbol: Symbol) -> Self {
        Self {
            payouts,
            jackpot_symbol,
        }
    }

    /// Evaluate a spin. Pure: same inputs, same result.
    pub fn evaluate(&self, outcome: &SpinOutcome, bet: u64) -> WinResult {
        let s = outcome.symbols;

        let (kind, winning_reels) = if s[0] == s[1] && s[1] == s[2] {
            let kind = if s[0] == self.jackpot_symbol {
                WinKind::Jackpot
            } else {
                WinKind::ThreeOfKind
            };
            (kind, vec![0, 1, 2])
        } else if let Some(&(a, b)) = PAIR_ORDER.iter().find(|&&(a, b)| s[a] == s[b]) {
            (WinKind::TwoOfKind, vec![a, b])
        } else {
            return WinResult::none();
        };

        let multiplier = self.payouts.multiplier(kind);
        WinResult {
            kind,
            multiplier,
            amount: bet.saturating_mul(multiplier),
            winning_reels,
        }
    }
}

impl Default for PayTable {
    fn default() -> Self {
        Self::new(Payouts::default(), Symbol::CircusTent)
    }
}
