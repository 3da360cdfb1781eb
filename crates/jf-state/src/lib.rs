//! jf-state: Session persistence for the Just Fun slot machine
//!
//! Everything the game keeps between sessions lives in one flat JSON object
//! stored under a versioned key:
//!
//! ```text
//! { credits, bet, lang, sound, animations, particles, vibration,
//!   biggestWin, totalSpins, totalWins }
//! ```
//!
//! Loading is lenient (every field falls back to its default on its own),
//! writing always emits the full object. There is no migration logic: a
//! schema change bumps the storage key and old data is abandoned.

mod error;
mod persistence;
mod preferences;
mod snapshot;
mod store;

pub use error::*;
pub use persistence::*;
pub use preferences::*;
pub use snapshot::*;
pub use store::*;
