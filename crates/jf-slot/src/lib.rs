//! # jf-slot: Spin resolution and award engine
//!
//! The rules of the Just Fun slot machine: three reels over a five-symbol
//! alphabet, a credit/bet ledger and a spin state machine that keeps at most
//! one spin in flight.
//!
//! ## Architecture
//!
//! ```text
//! Command ──> SlotMachine::dispatch
//!                 │
//!                 ├── GameSession (owned)
//!                 │     ├── EconomyLedger (credits, bet, stats)
//!                 │     ├── OutcomeGenerator (uniform symbol per reel)
//!                 │     └── Preferences
//!                 ├── PayTable::evaluate (pure)
//!                 ├── Presenter (reel animation + feedback, external)
//!                 └── Persistence (best-effort snapshot)
//! ```
//!
//! A spin runs `Idle -> Deducting -> Resolving -> Settling -> Idle`. The only
//! suspension point is the join over the presenter's per-reel stop signals.

pub mod command;
pub mod config;
pub mod error;
pub mod ledger;
pub mod machine;
pub mod paytable;
pub mod presenter;
pub mod rng;
pub mod symbols;
pub mod timing;

pub use command::*;
pub use config::*;
pub use error::*;
pub use ledger::*;
pub use machine::*;
pub use paytable::*;
pub use presenter::*;
pub use rng::*;
pub use symbols::*;
pub use timing::*;

pub use jf_state::{Language, Persistence, Preferences, SessionSnapshot, Toggle};
