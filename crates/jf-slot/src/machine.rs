//! Spin state machine
//!
//! [`SlotMachine`] owns the [`GameSession`] behind a mutex and runs one spin
//! at a time:
//!
//! ```text
//! Idle ──trigger──> Deducting ──reels stopped──> Resolving ──> Settling ──> Idle
//!   │
//!   └── credits < bet: refused, nothing changes
//! ```
//!
//! The session lock is never held across an await or while calling the
//! presenter. Bet and credit adjustments stay available while the reels turn;
//! only a second spin is refused.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use jf_state::{Language, Persistence, Preferences, SessionSnapshot, Toggle};

use crate::config::SlotConfig;
use crate::error::{SlotError, SlotResult};
use crate::ledger::{BetChange, EconomyLedger, SessionStats};
use crate::paytable::{PayTable, WinResult};
use crate::presenter::{Presenter, ReelStop};
use crate::rng::OutcomeGenerator;
use crate::symbols::{SpinOutcome, Symbol};

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the current spin is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    /// No spin running
    #[default]
    Idle,
    /// Bet taken, waiting for the reels to stop
    Deducting,
    /// Evaluating the outcome
    Resolving,
    /// Paying out and recording statistics
    Settling,
}

/// Economy view handed to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomySnapshot {
    pub credits: u64,
    pub bet: u64,
    pub total_spins: u64,
    pub total_wins: u64,
    pub biggest_win: u64,
}

impl EconomySnapshot {
    /// Percentage of spins that paid out
    pub fn hit_rate(&self) -> f64 {
        self.stats().hit_rate()
    }

    fn stats(&self) -> SessionStats {
        SessionStats {
            total_spins: self.total_spins,
            total_wins: self.total_wins,
            biggest_win: self.biggest_win,
        }
    }
}

/// Everything about one settled spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub outcome: SpinOutcome,
    pub win: WinResult,
    /// Bet captured when the spin was accepted
    pub bet: u64,
    /// Balance before the bet was taken
    pub credits_before: u64,
    /// Balance after settlement
    pub credits_after: u64,
    /// Outcome came from the admin queue instead of the generator
    pub forced: bool,
    /// Settled without every reel reporting a stop
    pub timed_out: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// GAME SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// A spin that passed the credit check
#[derive(Debug, Clone, Copy)]
struct AcceptedSpin {
    bet: u64,
    outcome: SpinOutcome,
    forced: bool,
    before: EconomySnapshot,
    after_deduct: EconomySnapshot,
}

/// Mutable game state: ledger, preferences, generator and admin queue
#[derive(Debug)]
pub struct GameSession {
    ledger: EconomyLedger,
    preferences: Preferences,
    generator: OutcomeGenerator,
    paytable: PayTable,
    forced: VecDeque<SpinOutcome>,
    phase: SpinPhase,
    /// Deducted but not yet settled
    pending: Option<AcceptedSpin>,
}

impl GameSession {
    /// Build a session from a (possibly stored) snapshot
    pub fn restore(config: &SlotConfig, snapshot: &SessionSnapshot, generator: OutcomeGenerator) -> Self {
        let stats = SessionStats {
            total_spins: snapshot.total_spins,
            total_wins: snapshot.total_wins,
            biggest_win: snapshot.biggest_win,
        };
        Self {
            ledger: EconomyLedger::restore(snapshot.credits, snapshot.bet, stats, config.bet_limits),
            preferences: snapshot.preferences,
            generator,
            paytable: config.paytable(),
            forced: VecDeque::new(),
            phase: SpinPhase::Idle,
            pending: None,
        }
    }

    pub fn ledger(&self) -> &EconomyLedger {
        &self.ledger
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    /// Forced outcomes waiting for a spin
    pub fn pending_forced(&self) -> usize {
        self.forced.len()
    }

    pub fn economy(&self) -> EconomySnapshot {
        let stats = self.ledger.stats();
        EconomySnapshot {
            credits: self.ledger.credits(),
            bet: self.ledger.bet(),
            total_spins: stats.total_spins,
            total_wins: stats.total_wins,
            biggest_win: stats.biggest_win,
        }
    }

    /// Full persisted view
    pub fn snapshot(&self) -> SessionSnapshot {
        let economy = self.economy();
        SessionSnapshot {
            credits: economy.credits,
            bet: economy.bet,
            preferences: self.preferences,
            biggest_win: economy.biggest_win,
            total_spins: economy.total_spins,
            total_wins: economy.total_wins,
        }
    }

    /// Credit check, deduction and outcome draw
    fn begin_spin(&mut self) -> SlotResult<AcceptedSpin> {
        let before = self.economy();
        let bet = before.bet;
        self.ledger.deduct(bet)?;
        self.phase = SpinPhase::Deducting;

        let (outcome, forced) = match self.forced.pop_front() {
            Some(outcome) => (outcome, true),
            None => (self.generator.generate_spin_outcome(), false),
        };

        let spin = AcceptedSpin {
            bet,
            outcome,
            forced,
            before,
            after_deduct: self.economy(),
        };
        self.pending = Some(spin);
        Ok(spin)
    }

    /// Evaluate with the captured bet, pay out and count the spin
    fn settle(&mut self, spin: &AcceptedSpin) -> (WinResult, EconomySnapshot) {
        self.phase = SpinPhase::Resolving;
        let win = self.paytable.evaluate(&spin.outcome, spin.bet);

        self.phase = SpinPhase::Settling;
        let before_award = self.economy();
        if win.amount > 0 {
            self.ledger.award(win.amount);
        }
        self.ledger.record_spin(win.is_win(), win.amount);
        self.pending = None;
        self.phase = SpinPhase::Idle;
        (win, before_award)
    }
}

/// Clears the in-progress flag however the spin ends. A spin dropped
/// before settlement is settled here with its drawn outcome.
struct SpinGuard<'a, P: Presenter> {
    machine: &'a SlotMachine<P>,
}

impl<P: Presenter> Drop for SpinGuard<'_, P> {
    fn drop(&mut self) {
        let machine = self.machine;
        let settled = {
            let mut session = machine.session.lock();
            match session.pending {
                Some(spin) => {
                    let (win, before_award) = session.settle(&spin);
                    Some((spin, win, before_award, session.economy()))
                }
                None => None,
            }
        };

        if let Some((spin, win, before_award, after)) = settled {
            log::warn!(
                "[SlotMachine] Spin abandoned before the reels stopped; settled {} for {}",
                spin.outcome,
                win.amount
            );
            machine.presenter.render_outcome(&win);
            machine.notify(&before_award, &after);
            machine.save();
        }
        machine.in_progress.store(false, Ordering::SeqCst);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SLOT MACHINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for [`SlotMachine`]
#[derive(Debug, Default)]
pub struct SlotMachineBuilder {
    config: SlotConfig,
    persistence: Option<Persistence>,
    seed: Option<u64>,
}

impl SlotMachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Game configuration
    pub fn config(mut self, config: SlotConfig) -> Self {
        self.config = config;
        self
    }

    /// Load from and save to this adapter
    pub fn persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Reproducible outcomes
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the config, load the stored session and build the machine
    pub fn build<P: Presenter>(self, presenter: P) -> SlotResult<SlotMachine<P>> {
        self.config.validate()?;

        let generator = match self.seed {
            Some(seed) => OutcomeGenerator::seeded(seed),
            None => OutcomeGenerator::new(),
        };

        let defaults = SessionSnapshot::new(self.config.initial_credits, self.config.initial_bet);
        let snapshot = match &self.persistence {
            Some(persistence) => persistence.load(&defaults),
            None => defaults,
        };
        let session = GameSession::restore(&self.config, &snapshot, generator);

        log::info!(
            "[SlotMachine] Ready: {} credits, bet {}, {} spins so far",
            session.ledger.credits(),
            session.ledger.bet(),
            session.ledger.stats().total_spins
        );

        Ok(SlotMachine {
            config: self.config,
            presenter,
            persistence: self.persistence,
            session: Mutex::new(session),
            in_progress: AtomicBool::new(false),
            save_lock: Mutex::new(()),
        })
    }
}

/// The slot machine: session state, presenter and persistence
pub struct SlotMachine<P: Presenter> {
    config: SlotConfig,
    presenter: P,
    persistence: Option<Persistence>,
    session: Mutex<GameSession>,
    in_progress: AtomicBool,
    /// Orders snapshot + write pairs so an older snapshot never lands last
    save_lock: Mutex<()>,
}

impl<P: Presenter> SlotMachine<P> {
    /// Machine with default config, no persistence
    pub fn new(presenter: P) -> SlotResult<Self> {
        SlotMachineBuilder::new().build(presenter)
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn persistence(&self) -> Option<&Persistence> {
        self.persistence.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// `{credits, bet, totalSpins, totalWins, biggestWin}`
    pub fn snapshot(&self) -> EconomySnapshot {
        self.session.lock().economy()
    }

    /// Everything that gets persisted
    pub fn session_snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    pub fn preferences(&self) -> Preferences {
        *self.session.lock().preferences()
    }

    pub fn phase(&self) -> SpinPhase {
        self.session.lock().phase()
    }

    pub fn is_spinning(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub fn pending_forced(&self) -> usize {
        self.session.lock().pending_forced()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Spin
    // ─────────────────────────────────────────────────────────────────────────

    /// Run one spin to settlement.
    ///
    /// Returns [`SlotError::SpinInProgress`] without touching anything if a
    /// spin is already running, and [`SlotError::InsufficientCredits`] if the
    /// balance does not cover the bet.
    pub async fn trigger_spin(&self) -> SlotResult<SpinRecord> {
        // Deducting
        let spin = match self.claim_spin() {
            Ok(spin) => spin,
            Err(e) => {
                match e {
                    SlotError::InsufficientCredits { credits, bet } => {
                        log::info!("[SlotMachine] Spin refused: {} credits, bet {}", credits, bet);
                        self.presenter.render_insufficient_credits(credits, bet);
                    }
                    _ => log::debug!("[SlotMachine] Trigger ignored: {}", e),
                }
                return Err(e);
            }
        };
        let _guard = SpinGuard { machine: self };

        log::debug!(
            "[SlotMachine] Spin accepted: bet {}, outcome {}{}",
            spin.bet,
            spin.outcome,
            if spin.forced { " (forced)" } else { "" }
        );
        self.notify(&spin.before, &spin.after_deduct);
        self.presenter.render_spin_started();
        self.save();

        let stops: Vec<ReelStop> = spin
            .outcome
            .symbols
            .iter()
            .enumerate()
            .map(|(reel, &symbol)| self.presenter.render_reel_spin(reel, symbol))
            .collect();
        let timed_out = self.await_reels(stops).await;

        // Resolving + Settling
        let (win, before_award, after) = {
            let mut session = self.session.lock();
            let (win, before_award) = session.settle(&spin);
            (win, before_award, session.economy())
        };

        if win.is_win() {
            log::info!(
                "[SlotMachine] {} pays {} ({:?} x{})",
                spin.outcome,
                win.amount,
                win.kind,
                win.multiplier
            );
        }
        self.presenter.render_outcome(&win);
        self.notify(&before_award, &after);
        if after.credits == 0 {
            self.presenter.render_no_credits();
        }
        self.save();

        Ok(SpinRecord {
            outcome: spin.outcome,
            win,
            bet: spin.bet,
            credits_before: spin.before.credits,
            credits_after: after.credits,
            forced: spin.forced,
            timed_out,
        })
    }

    /// Guard check, credit check, claim and deduction under the session lock.
    /// A refused spin never touches the in-progress flag.
    fn claim_spin(&self) -> SlotResult<AcceptedSpin> {
        let mut session = self.session.lock();
        if self.is_spinning() {
            return Err(SlotError::SpinInProgress);
        }
        let (credits, bet) = (session.ledger.credits(), session.ledger.bet());
        if !session.ledger.can_afford_spin(bet) {
            return Err(SlotError::InsufficientCredits { credits, bet });
        }
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SlotError::SpinInProgress);
        }
        session.begin_spin().inspect_err(|_| {
            self.in_progress.store(false, Ordering::SeqCst);
        })
    }

    /// Join every reel stop. Returns `true` if the configured timeout ran out.
    async fn await_reels(&self, stops: Vec<ReelStop>) -> bool {
        // A dropped sender counts as a stopped reel
        let all = join_all(stops);
        match self.config.reel_timeout() {
            Some(limit) => match tokio::time::timeout(limit, all).await {
                Ok(_) => false,
                Err(_) => {
                    log::warn!(
                        "[SlotMachine] AnimationTimeout: reels not stopped after {:?}, settling anyway",
                        limit
                    );
                    true
                }
            },
            None => {
                all.await;
                false
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Economy
    // ─────────────────────────────────────────────────────────────────────────

    /// Step the bet by `delta`, clamped into bounds
    pub fn change_bet(&self, delta: i64) -> BetChange {
        self.apply_bet(|ledger| ledger.change_bet(delta))
    }

    /// Request a bet value, clamped into bounds
    pub fn set_bet(&self, value: u64) -> BetChange {
        self.apply_bet(|ledger| ledger.set_bet(value))
    }

    fn apply_bet(&self, f: impl FnOnce(&mut EconomyLedger) -> BetChange) -> BetChange {
        let change = f(&mut self.session.lock().ledger);
        if let BetChange::Changed { old, new } = change {
            self.presenter.render_bet_changed(old, new);
            self.save();
        }
        change
    }

    /// Admin: add credits
    pub fn grant_credits(&self, amount: u64) -> EconomySnapshot {
        log::info!("[SlotMachine] Admin: granting {} credits", amount);
        self.apply_economy(|ledger| ledger.grant_credits(amount))
    }

    /// Admin: overwrite the balance
    pub fn set_credits(&self, value: u64) -> EconomySnapshot {
        log::info!("[SlotMachine] Admin: setting credits to {}", value);
        self.apply_economy(|ledger| ledger.set_credits(value))
    }

    /// Restore starting credits and bet and drop queued forced outcomes.
    /// Statistics are kept. Refused while a spin is running.
    pub fn reset(&self) -> SlotResult<EconomySnapshot> {
        let (before, after) = {
            let mut session = self.session.lock();
            if self.is_spinning() {
                return Err(SlotError::SpinInProgress);
            }
            let before = session.economy();
            session
                .ledger
                .reset(self.config.initial_credits, self.config.initial_bet);
            session.forced.clear();
            (before, session.economy())
        };
        log::info!("[SlotMachine] Game reset to {} credits", after.credits);
        self.notify(&before, &after);
        self.save();
        Ok(after)
    }

    fn apply_economy(&self, f: impl FnOnce(&mut EconomyLedger)) -> EconomySnapshot {
        let (before, after) = {
            let mut session = self.session.lock();
            let before = session.economy();
            f(&mut session.ledger);
            (before, session.economy())
        };
        self.notify(&before, &after);
        self.save();
        after
    }

    /// Tell the presenter what moved between two economy views
    fn notify(&self, before: &EconomySnapshot, after: &EconomySnapshot) {
        if before.credits != after.credits {
            self.presenter.render_credits_changed(before.credits, after.credits);
        }
        if before.bet != after.bet {
            self.presenter.render_bet_changed(before.bet, after.bet);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Admin outcomes
    // ─────────────────────────────────────────────────────────────────────────

    /// Queue an outcome for the next accepted spin. Returns the queue length.
    pub fn force_outcome(&self, outcome: SpinOutcome) -> usize {
        log::info!("[SlotMachine] Admin: next outcome forced to {}", outcome);
        let mut session = self.session.lock();
        session.forced.push_back(outcome);
        session.forced.len()
    }

    /// Three of the first symbol
    pub fn force_win(&self) -> usize {
        self.force_outcome(SpinOutcome::uniform(Symbol::ALL[0]))
    }

    /// Three distinct symbols
    pub fn force_loss(&self) -> usize {
        self.force_outcome(SpinOutcome::new([Symbol::ALL[0], Symbol::ALL[1], Symbol::ALL[2]]))
    }

    /// Three of the configured jackpot symbol
    pub fn force_jackpot(&self) -> usize {
        self.force_outcome(SpinOutcome::uniform(self.config.jackpot_symbol))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preferences
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_language(&self, language: Language) -> Preferences {
        self.apply_preferences(|prefs| prefs.language = language)
    }

    /// Switch between the primary and secondary language
    pub fn toggle_language(&self) -> Preferences {
        self.apply_preferences(|prefs| prefs.language = prefs.language.toggled())
    }

    pub fn set_preference(&self, toggle: Toggle, enabled: bool) -> Preferences {
        self.apply_preferences(|prefs| prefs.set(toggle, enabled))
    }

    pub fn toggle_preference(&self, toggle: Toggle) -> Preferences {
        self.apply_preferences(|prefs| {
            prefs.flip(toggle);
        })
    }

    fn apply_preferences(&self, f: impl FnOnce(&mut Preferences)) -> Preferences {
        let prefs = {
            let mut session = self.session.lock();
            f(&mut session.preferences);
            session.preferences
        };
        log::debug!("[SlotMachine] Preferences now {:?}", prefs);
        self.save();
        prefs
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the current session, best-effort
    pub fn save(&self) {
        if let Some(persistence) = &self.persistence {
            let _order = self.save_lock.lock();
            let snapshot = self.session_snapshot();
            persistence.save(&snapshot);
        }
    }
}

impl<P: Presenter> std::fmt::Debug for SlotMachine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotMachine")
            .field("economy", &self.snapshot())
            .field("spinning", &self.is_spinning())
            .field("persistence", &self.persistence)
            .finish()
    }
}
