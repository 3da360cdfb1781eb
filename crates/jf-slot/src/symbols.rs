//! Symbol alphabet and spin outcomes

use serde::{Deserialize, Serialize};

/// Number of symbols a reel can show
pub const ALPHABET_SIZE: usize = 5;

/// Number of reels
pub const REEL_COUNT: usize = 3;

/// Reel symbol. The discriminant is the symbol index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Symbol {
    /// Circus tent, the jackpot symbol in the default config
    CircusTent = 0,
    FerrisWheel = 1,
    RollerCoaster = 2,
    Carousel = 3,
    Lollipop = 4,
}

impl Symbol {
    /// The whole alphabet in index order
    pub const ALL: [Symbol; ALPHABET_SIZE] = [
        Symbol::CircusTent,
        Symbol::FerrisWheel,
        Symbol::RollerCoaster,
        Symbol::Carousel,
        Symbol::Lollipop,
    ];

    /// Index in `[0, ALPHABET_SIZE)`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Symbol at `index`, if in range
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display glyph
    pub fn glyph(self) -> &'static str {
        match self {
            Self::CircusTent => "🎪",
            Self::FerrisWheel => "🎡",
            Self::RollerCoaster => "🎢",
            Self::Carousel => "🎠",
            Self::Lollipop => "🍭",
        }
    }

    /// Stable name
    pub fn name(self) -> &'static str {
        match self {
            Self::CircusTent => "circus_tent",
            Self::FerrisWheel => "ferris_wheel",
            Self::RollerCoaster => "roller_coaster",
            Self::Carousel => "carousel",
            Self::Lollipop => "lollipop",
        }
    }

    /// Parse a name, glyph or index
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index);
        }
        Self::ALL
            .into_iter()
            .find(|sym| sym.name().eq_ignore_ascii_case(s) || sym.glyph() == s)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}

/// The symbols a spin landed on, one per reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub symbols: [Symbol; REEL_COUNT],
}

impl SpinOutcome {
    pub fn new(symbols: [Symbol; REEL_COUNT]) -> Self {
        Self { symbols }
    }

    /// Same symbol on every reel
    pub fn uniform(symbol: Symbol) -> Self {
        Self::new([symbol; REEL_COUNT])
    }

    /// Build from symbol indices
    pub fn from_indices(indices: [usize; REEL_COUNT]) -> Option<Self> {
        Some(Self::new([
            Symbol::from_index(indices[0])?,
            Symbol::from_index(indices[1])?,
            Symbol::from_index(indices[2])?,
        ]))
    }

    /// Symbol indices
    pub fn indices(&self) -> [usize; REEL_COUNT] {
        self.symbols.map(Symbol::index)
    }

    /// Symbol on `reel`
    pub fn symbol(&self, reel: usize) -> Option<Symbol> {
        self.symbols.get(reel).copied()
    }
}

impl std::fmt::Display for SpinOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c] = self.symbols;
        write!(f, "{a} | {b} | {c}")
    }
}
