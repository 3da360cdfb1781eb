//! Just Fun slot machine in the terminal
//!
//! Usage:
//!   justfun                     - play interactively
//!   justfun spin --count 10     - spin without prompting
//!   justfun stats               - show the saved session
//!   justfun reset               - back to the initial credits
//!   justfun forget              - delete the saved session
//!   justfun exec '{"type":"set_bet","value":3}'

mod messages;
mod play;
mod report;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use jf_slot::{
    CommandOutcome, Language, Persistence, SlotConfig, SlotError, SlotMachine, SlotMachineBuilder,
    TimingConfig, TimingProfile, Toggle,
};
use jf_state::FileStore;

use crate::terminal::TerminalPresenter;

#[derive(Parser)]
#[command(name = "justfun", about = "Just Fun slot machine", version)]
struct Cli {
    /// Config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for saved sessions (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Reel speed: normal, turbo, instant
    #[arg(long, global = true, value_parser = parse_speed)]
    speed: Option<TimingProfile>,

    /// Shortcut for --speed turbo
    #[arg(long, global = true, conflicts_with_all = ["speed", "instant"])]
    turbo: bool,

    /// Shortcut for --speed instant
    #[arg(long, global = true, conflicts_with = "speed")]
    instant: bool,

    /// Seed the outcome generator
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively (default)
    Play,
    /// Spin without prompting
    Spin {
        /// Number of spins
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
        /// Force the first outcome
        #[arg(long, value_enum)]
        force: Option<Force>,
    },
    /// Show the saved session
    Stats {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Back to the initial credits and bet (statistics are kept)
    Reset,
    /// Delete the saved session, statistics included
    Forget,
    /// Admin: add credits
    Grant { amount: u64 },
    /// Admin: overwrite the balance
    SetCredits { value: u64 },
    /// Set the bet
    Bet { value: u64 },
    /// Set the language (pt, en), or switch it when omitted
    Lang { code: Option<String> },
    /// Flip a preference: sound, animations, particles, vibration
    Toggle { name: String },
    /// Run one JSON command and print the result
    Exec { json: String },
    /// Print the effective config as JSON
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Force {
    Win,
    Loss,
    Jackpot,
}

type Machine = SlotMachine<Arc<TerminalPresenter>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    if let Some(Commands::Config) = cli.command {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let machine = build_machine(&cli, config)?;
    let presenter = Arc::clone(machine.presenter());
    presenter.set_preferences(machine.preferences());

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Play => play::run(&machine).await?,
        Commands::Spin { count, force } => spin(&machine, count, force).await?,
        Commands::Stats { json } => {
            let snapshot = machine.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                report::print_economy(presenter.preferences().language, &snapshot);
            }
        }
        Commands::Reset => {
            let snapshot = machine.reset()?;
            report::print_economy(presenter.preferences().language, &snapshot);
        }
        Commands::Forget => match machine.persistence() {
            Some(persistence) => {
                persistence.clear();
                println!("saved session '{}' deleted", persistence.key());
            }
            None => println!("nothing saved in an ephemeral session"),
        },
        Commands::Grant { amount } => {
            machine.grant_credits(amount);
        }
        Commands::SetCredits { value } => {
            machine.set_credits(value);
        }
        Commands::Bet { value } => {
            if !machine.set_bet(value).is_changed() {
                println!("bet unchanged: {}", machine.snapshot().bet);
            }
        }
        Commands::Lang { code } => {
            let prefs = match code {
                Some(code) => {
                    let language = Language::from_code(&code)
                        .with_context(|| format!("Unknown language: {code}"))?;
                    machine.set_language(language)
                }
                None => machine.toggle_language(),
            };
            println!("{}", report::preferences_line(&prefs));
        }
        Commands::Toggle { name } => {
            let toggle =
                Toggle::from_name(&name).with_context(|| format!("Unknown preference: {name}"))?;
            let prefs = machine.toggle_preference(toggle);
            println!("{}", report::preferences_line(&prefs));
        }
        Commands::Exec { json } => {
            let outcome = machine.dispatch_json(&json).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Config => {}
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn load_config(cli: &Cli) -> Result<SlotConfig> {
    let mut config = match &cli.config {
        Some(path) => SlotConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SlotConfig::default(),
    };
    let speed = if cli.turbo {
        Some(TimingProfile::Turbo)
    } else if cli.instant {
        Some(TimingProfile::Instant)
    } else {
        cli.speed
    };
    if let Some(profile) = speed {
        config.timing = TimingConfig::from_profile(profile);
    }
    Ok(config)
}

fn parse_speed(name: &str) -> Result<TimingProfile, String> {
    TimingProfile::from_name(name).ok_or_else(|| format!("unknown speed: {name}"))
}

fn build_machine(cli: &Cli, config: SlotConfig) -> Result<Machine> {
    let presenter = Arc::new(TerminalPresenter::new(config.timing, cli.seed));

    let mut builder = SlotMachineBuilder::new();
    if !cli.ephemeral {
        let store = match &cli.data_dir {
            Some(dir) => FileStore::new(dir),
            None => FileStore::in_default_dir(),
        };
        log::info!("Saving sessions under {}", store.dir().display());
        builder = builder.persistence(Persistence::new(Arc::new(store), config.storage_key.clone()));
    }
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }

    builder
        .config(config)
        .build(presenter)
        .context("Failed to start the slot machine")
}

async fn spin(machine: &Machine, count: u32, force: Option<Force>) -> Result<()> {
    match force {
        Some(Force::Win) => machine.force_win(),
        Some(Force::Loss) => machine.force_loss(),
        Some(Force::Jackpot) => machine.force_jackpot(),
        None => 0,
    };

    let mut settled = 0;
    for _ in 0..count {
        match machine.dispatch(jf_slot::Command::Spin).await {
            Ok(CommandOutcome::Spun(record)) => {
                settled += 1;
                log::debug!("Spin {} settled: {:?}", settled, record);
            }
            Ok(other) => bail!("Unexpected outcome: {other:?}"),
            Err(SlotError::InsufficientCredits { .. }) => break,
            Err(e) => return Err(e).context("Spin failed"),
        }
    }

    let presenter = machine.presenter();
    report::print_economy(presenter.preferences().language, &machine.snapshot());
    Ok(())
}
