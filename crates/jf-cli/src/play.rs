//! Interactive play loop

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use jf_slot::{
    Command, CommandOutcome, Language, SlotError, SlotMachine, Symbol, Toggle,
};

use crate::messages::{Text, paytable_lines};
use crate::report;
use crate::terminal::TerminalPresenter;

/// One line of player input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Help,
    Paytable,
    Stats,
    Quit,
}

const HELP: &str = "\
  ENTER | spin        spin the reels
  + | -               raise / lower the bet
  bet <n>             set the bet
  lang [pt|en]        switch language
  toggle <name>       sound, animations, particles, vibration
  paytable | stats    show the paytable / statistics
  reset               start over with the initial credits
  grant <n>           admin: add credits
  credits <n>         admin: set credits
  force <win|loss|jackpot|a b c>
                      admin: force the next outcome
  {json}              raw command, e.g. {\"type\":\"set_bet\",\"value\":3}
  quit";

/// Parse a line of input
pub fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    if line.starts_with('{') {
        return Command::from_json(line)
            .map(Input::Command)
            .map_err(|e| e.to_string());
    }

    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or("").to_ascii_lowercase();
    let rest: Vec<&str> = words.collect();

    let number = |what: &str| -> Result<u64, String> {
        rest.first()
            .ok_or_else(|| format!("{what} needs a number"))?
            .parse::<u64>()
            .map_err(|e| format!("bad {what}: {e}"))
    };

    let command = match head.as_str() {
        "" | "s" | "spin" | "girar" => Command::Spin,
        "+" | "up" => Command::ChangeBet { delta: 1 },
        "-" | "down" => Command::ChangeBet { delta: -1 },
        "bet" | "aposta" => Command::SetBet {
            value: number("bet")?,
        },
        "lang" | "idioma" => match rest.first() {
            None => Command::ToggleLanguage,
            Some(code) => Command::SetLanguage {
                language: Language::from_code(code)
                    .ok_or_else(|| format!("unknown language: {code}"))?,
            },
        },
        "toggle" => {
            let name = rest.first().ok_or("toggle needs a name")?;
            Command::TogglePreference {
                toggle: Toggle::from_name(name).ok_or_else(|| format!("unknown toggle: {name}"))?,
            }
        }
        "reset" => Command::Reset,
        "grant" => Command::GrantCredits {
            amount: number("amount")?,
        },
        "credits" => Command::SetCredits {
            value: number("credits")?,
        },
        "force" => parse_force(&rest)?,
        "paytable" => return Ok(Input::Paytable),
        "stats" => return Ok(Input::Stats),
        "help" | "?" => return Ok(Input::Help),
        "q" | "quit" | "exit" | "sair" => return Ok(Input::Quit),
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Input::Command(command))
}

fn parse_force(args: &[&str]) -> Result<Command, String> {
    match args {
        ["win"] => Ok(Command::ForceWin),
        ["loss" | "lose"] => Ok(Command::ForceLoss),
        ["jackpot"] => Ok(Command::ForceJackpot),
        [a, b, c] => {
            let parse = |s: &str| Symbol::parse(s).ok_or_else(|| format!("unknown symbol: {s}"));
            Ok(Command::ForceOutcome {
                symbols: [parse(*a)?, parse(*b)?, parse(*c)?],
            })
        }
        _ => Err("force needs win, loss, jackpot or three symbols".into()),
    }
}

/// Read commands from stdin until `quit` or end of input
pub async fn run(machine: &SlotMachine<Arc<TerminalPresenter>>) -> Result<()> {
    let presenter = machine.presenter();
    presenter.set_preferences(machine.preferences());

    presenter.say(Text::Welcome);
    report::print_economy(presenter.preferences().language, &machine.snapshot());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };

        let lang = presenter.preferences().language;
        match input {
            Input::Quit => break,
            Input::Help => println!("{HELP}"),
            Input::Paytable => {
                let config = machine.config();
                for line in paytable_lines(lang, &config.payouts, config.jackpot_symbol) {
                    println!("{line}");
                }
            }
            Input::Stats => report::print_economy(lang, &machine.snapshot()),
            Input::Command(command) => match machine.dispatch(command).await {
                Ok(CommandOutcome::Preferences(prefs)) => {
                    presenter.set_preferences(prefs);
                    println!("{}", report::preferences_line(&prefs));
                }
                Ok(CommandOutcome::Queued { pending }) => println!("forced outcomes queued: {pending}"),
                Ok(_) => {}
                // Already shown by the presenter
                Err(SlotError::InsufficientCredits { .. }) => {}
                Err(SlotError::SpinInProgress) => presenter.say(Text::SpinInProgress),
                Err(e) => eprintln!("{e}"),
            },
        }
    }

    presenter.say(Text::Goodbye);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match parse_input(line) {
            Ok(Input::Command(cmd)) => cmd,
            other => panic!("expected a command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_spin_aliases() {
        assert_eq!(command(""), Command::Spin);
        assert_eq!(command("  girar "), Command::Spin);
        assert_eq!(command("SPIN"), Command::Spin);
    }

    #[test]
    fn test_bet_commands() {
        assert_eq!(command("+"), Command::ChangeBet { delta: 1 });
        assert_eq!(command("-"), Command::ChangeBet { delta: -1 });
        assert_eq!(command("bet 7"), Command::SetBet { value: 7 });
        assert!(parse_input("bet").is_err());
        assert!(parse_input("bet -2").is_err());
    }

    #[test]
    fn test_preference_commands() {
        assert_eq!(command("lang"), Command::ToggleLanguage);
        assert_eq!(
            command("lang en-GB"),
            Command::SetLanguage { language: Language::English }
        );
        assert_eq!(
            command("toggle sound"),
            Command::TogglePreference { toggle: Toggle::Sound }
        );
        assert!(parse_input("toggle volume").is_err());
    }

    #[test]
    fn test_force_commands() {
        assert_eq!(command("force win"), Command::ForceWin);
        assert_eq!(command("force jackpot"), Command::ForceJackpot);
        assert_eq!(
            command("force 🍭 lollipop 3"),
            Command::ForceOutcome {
                symbols: [Symbol::Lollipop, Symbol::Lollipop, Symbol::Carousel]
            }
        );
        assert!(parse_input("force 🍭 9 3").is_err());
    }

    #[test]
    fn test_json_and_meta() {
        assert_eq!(
            command(r#"{"type":"grant_credits","amount":5}"#),
            Command::GrantCredits { amount: 5 }
        );
        assert_eq!(parse_input("quit"), Ok(Input::Quit));
        assert_eq!(parse_input("?"), Ok(Input::Help));
        assert!(parse_input("dance").is_err());
    }
}
