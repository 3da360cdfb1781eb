//! Terminal presenter
//!
//! Prints each reel as its timer fires and narrates the spin in the player's
//! language. With animations off the reels stop at once.

use parking_lot::Mutex;

use jf_slot::{
    InstantPresenter, Preferences, Presenter, ReelStop, Symbol, TimedReels, TimingConfig, WinKind,
    WinResult,
};

use crate::messages::{Text, text};

pub struct TerminalPresenter {
    reels: TimedReels,
    preferences: Mutex<Preferences>,
}

impl TerminalPresenter {
    pub fn new(timing: TimingConfig, seed: Option<u64>) -> Self {
        let reels = match seed {
            Some(seed) => TimedReels::seeded(timing, seed),
            None => TimedReels::new(timing),
        };
        Self {
            reels,
            preferences: Mutex::new(Preferences::default()),
        }
    }

    /// Follow the machine's current preferences
    pub fn set_preferences(&self, preferences: Preferences) {
        *self.preferences.lock() = preferences;
    }

    pub fn preferences(&self) -> Preferences {
        *self.preferences.lock()
    }

    /// Print a message in the current language
    pub fn say(&self, key: Text) {
        println!("{}", text(self.preferences().language, key));
    }
}

impl Presenter for TerminalPresenter {
    fn render_reel_spin(&self, reel: usize, symbol: Symbol) -> ReelStop {
        let show = move || println!("  [{}] {}", reel + 1, symbol);
        if self.preferences().animations {
            self.reels.schedule(reel, show)
        } else {
            show();
            InstantPresenter.render_reel_spin(reel, symbol)
        }
    }

    fn render_outcome(&self, win: &WinResult) {
        let prefs = self.preferences();
        let lang = prefs.language;
        match win.kind {
            WinKind::None => println!("{}", text(lang, Text::Lose)),
            WinKind::Jackpot => println!("{} +{}", text(lang, Text::Jackpot), win.amount),
            WinKind::TwoOfKind | WinKind::ThreeOfKind => {
                let reels: Vec<String> = win.winning_reels.iter().map(|r| (r + 1).to_string()).collect();
                println!(
                    "{} +{} ({}x, [{}])",
                    text(lang, Text::Win),
                    win.amount,
                    win.multiplier,
                    reels.join(",")
                );
            }
        }
        if prefs.sound && win.is_win() {
            // Terminal bell
            print!("\x07");
        }
    }

    fn render_credits_changed(&self, old: u64, new: u64) {
        let label = text(self.preferences().language, Text::Credits);
        println!("{label}: {old} → {new}");
    }

    fn render_bet_changed(&self, old: u64, new: u64) {
        let label = text(self.preferences().language, Text::Bet);
        println!("{label}: {old} → {new}");
    }

    fn render_spin_started(&self) {
        self.say(Text::Spinning);
    }

    fn render_insufficient_credits(&self, credits: u64, bet: u64) {
        let lang = self.preferences().language;
        println!(
            "{} ({}: {}, {}: {})",
            text(lang, Text::InsufficientCredits),
            text(lang, Text::Credits),
            credits,
            text(lang, Text::Bet),
            bet
        );
    }

    fn render_no_credits(&self) {
        self.say(Text::NoCredits);
        self.say(Text::PlayAgain);
    }
}
