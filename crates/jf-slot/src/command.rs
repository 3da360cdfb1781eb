//! Command dispatch
//!
//! Hosts drive the machine with [`Command`] values instead of poking at its
//! state. Commands serialize as `{"type": "change_bet", "delta": 1}` so they
//! can cross a process or FFI boundary unchanged.

use serde::{Deserialize, Serialize};

use jf_state::{Language, Preferences, Toggle};

use crate::error::{SlotError, SlotResult};
use crate::ledger::BetChange;
use crate::machine::{EconomySnapshot, SlotMachine, SpinRecord};
use crate::presenter::Presenter;
use crate::symbols::{REEL_COUNT, SpinOutcome, Symbol};

/// Host request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Start a spin (ignored while one is running)
    Spin,
    /// Step the bet up or down
    ChangeBet { delta: i64 },
    /// Request a bet value
    SetBet { value: u64 },
    /// Report the economy without changing it
    Snapshot,
    /// Back to starting credits and bet
    Reset,
    SetLanguage { language: Language },
    ToggleLanguage,
    SetPreference { toggle: Toggle, enabled: bool },
    TogglePreference { toggle: Toggle },

    // Admin interface
    GrantCredits { amount: u64 },
    SetCredits { value: u64 },
    ForceOutcome { symbols: [Symbol; REEL_COUNT] },
    ForceWin,
    ForceLoss,
    ForceJackpot,
}

impl Command {
    /// Commands that bypass normal play
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::GrantCredits { .. }
                | Self::SetCredits { .. }
                | Self::ForceOutcome { .. }
                | Self::ForceWin
                | Self::ForceLoss
                | Self::ForceJackpot
        )
    }

    /// Parse a JSON command
    pub fn from_json(json: &str) -> SlotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What a command did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum CommandOutcome {
    Spun(SpinRecord),
    Bet(BetChange),
    Economy(EconomySnapshot),
    Preferences(Preferences),
    /// Forced outcome queued; `pending` outcomes now waiting
    Queued { pending: usize },
}

impl<P: Presenter> SlotMachine<P> {
    /// Apply one command
    pub async fn dispatch(&self, command: Command) -> SlotResult<CommandOutcome> {
        log::trace!("[SlotMachine] Dispatch {:?}", command);
        let outcome = match command {
            Command::Spin => CommandOutcome::Spun(self.trigger_spin().await?),
            Command::ChangeBet { delta } => CommandOutcome::Bet(self.change_bet(delta)),
            Command::SetBet { value } => CommandOutcome::Bet(self.set_bet(value)),
            Command::Snapshot => CommandOutcome::Economy(self.snapshot()),
            Command::Reset => CommandOutcome::Economy(self.reset()?),
            Command::SetLanguage { language } => {
                CommandOutcome::Preferences(self.set_language(language))
            }
            Command::ToggleLanguage => CommandOutcome::Preferences(self.toggle_language()),
            Command::SetPreference { toggle, enabled } => {
                CommandOutcome::Preferences(self.set_preference(toggle, enabled))
            }
            Command::TogglePreference { toggle } => {
                CommandOutcome::Preferences(self.toggle_preference(toggle))
            }
            Command::GrantCredits { amount } => {
                CommandOutcome::Economy(self.grant_credits(amount))
            }
            Command::SetCredits { value } => CommandOutcome::Economy(self.set_credits(value)),
            Command::ForceOutcome { symbols } => CommandOutcome::Queued {
                pending: self.force_outcome(SpinOutcome::new(symbols)),
            },
            Command::ForceWin => CommandOutcome::Queued {
                pending: self.force_win(),
            },
            Command::ForceLoss => CommandOutcome::Queued {
                pending: self.force_loss(),
            },
            Command::ForceJackpot => CommandOutcome::Queued {
                pending: self.force_jackpot(),
            },
        };
        Ok(outcome)
    }

    /// Apply a JSON command
    pub async fn dispatch_json(&self, json: &str) -> SlotResult<CommandOutcome> {
        let command = Command::from_json(json).map_err(|e| match e {
            SlotError::Serialization(msg) => SlotError::Serialization(format!("bad command: {msg}")),
            other => other,
        })?;
        self.dispatch(command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::SlotMachineBuilder;
    use crate::paytable::WinKind;
    use crate::presenter::InstantPresenter;

    fn machine() -> SlotMachine<InstantPresenter> {
        SlotMachineBuilder::new().seed(1).build(InstantPresenter).unwrap()
    }

    #[test]
    fn test_command_wire_format() {
        let json = serde_json::to_string(&Command::ChangeBet { delta: -1 }).unwrap();
        assert_eq!(json, r#"{"type":"change_bet","delta":-1}"#);

        let cmd = Command::from_json(r#"{"type":"set_language","language":"en"}"#).unwrap();
        assert_eq!(cmd, Command::SetLanguage { language: Language::English });

        let cmd = Command::from_json(
            r#"{"type":"force_outcome","symbols":["lollipop","lollipop","carousel"]}"#,
        )
        .unwrap();
        assert!(cmd.is_admin());
        assert!(Command::from_json(r#"{"type":"explode"}"#).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_spin_and_bet() {
        let m = machine();
        assert_eq!(
            m.dispatch(Command::ChangeBet { delta: 1 }).await.unwrap(),
            CommandOutcome::Bet(BetChange::Changed { old: 1, new: 2 })
        );
        assert_eq!(
            m.dispatch(Command::ForceWin).await.unwrap(),
            CommandOutcome::Queued { pending: 1 }
        );

        let CommandOutcome::Spun(record) = m.dispatch(Command::Spin).await.unwrap() else {
            panic!("expected a spin record");
        };
        assert_eq!(record.bet, 2);
        assert_eq!(record.win.kind, WinKind::Jackpot);
        assert_eq!(record.credits_after, 100 - 2 + 100);
    }

    #[tokio::test]
    async fn test_dispatch_json() {
        let m = machine();
        m.dispatch_json(r#"{"type":"set_credits","value":0}"#).await.unwrap();
        assert_eq!(
            m.dispatch_json(r#"{"type":"spin"}"#).await,
            Err(SlotError::InsufficientCredits { credits: 0, bet: 1 })
        );
        assert!(matches!(
            m.dispatch_json("not json").await,
            Err(SlotError::Serialization(_))
        ));
    }
}
