//! Error types for the slot engine

use thiserror::Error;

/// Slot engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// Balance does not cover the bet; the spin was refused
    #[error("Insufficient credits: {credits} available, bet is {bet}")]
    InsufficientCredits { credits: u64, bet: u64 },

    /// A spin is already running; the trigger was ignored
    #[error("Spin already in progress")]
    SpinInProgress,

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SlotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for SlotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yml::Error> for SlotError {
    fn from(e: serde_yml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
