//! Presentation seam
//!
//! The engine never draws anything. It hands each reel's final symbol to a
//! [`Presenter`] and waits on the returned [`ReelStop`] signals; everything
//! else it tells the presenter is fire-and-forget.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::prelude::*;
use tokio::sync::oneshot;

use crate::paytable::WinResult;
use crate::symbols::Symbol;
use crate::timing::TimingConfig;

/// Resolves once a reel has visibly stopped. A dropped sender counts as
/// stopped.
pub type ReelStop = oneshot::Receiver<()>;

/// Sending half of a reel stop signal
#[derive(Debug)]
pub struct ReelDone(oneshot::Sender<()>);

impl ReelDone {
    /// Signal that the reel has stopped
    pub fn complete(self) {
        // The spin may have stopped waiting (timeout); nothing to do then
        let _ = self.0.send(());
    }
}

/// Create a linked reel stop pair
pub fn reel_signal() -> (ReelDone, ReelStop) {
    let (tx, rx) = oneshot::channel();
    (ReelDone(tx), rx)
}

/// Presentation layer as seen by the engine
pub trait Presenter: Send + Sync {
    /// Start animating `reel` towards `symbol`; the returned signal fires when
    /// it has stopped
    fn render_reel_spin(&self, reel: usize, symbol: Symbol) -> ReelStop;

    /// Spin settled (win or loss)
    fn render_outcome(&self, _win: &WinResult) {}

    /// Balance moved from `old` to `new`
    fn render_credits_changed(&self, _old: u64, _new: u64) {}

    /// Bet moved from `old` to `new`
    fn render_bet_changed(&self, _old: u64, _new: u64) {}

    /// A spin was accepted and the reels are about to move
    fn render_spin_started(&self) {}

    /// A spin was refused because the balance does not cover the bet
    fn render_insufficient_credits(&self, _credits: u64, _bet: u64) {}

    /// Balance reached zero after settlement
    fn render_no_credits(&self) {}
}

impl<P: Presenter + ?Sized> Presenter for Arc<P> {
    fn render_reel_spin(&self, reel: usize, symbol: Symbol) -> ReelStop {
        (**self).render_reel_spin(reel, symbol)
    }

    fn render_outcome(&self, win: &WinResult) {
        (**self).render_outcome(win)
    }

    fn render_credits_changed(&self, old: u64, new: u64) {
        (**self).render_credits_changed(old, new)
    }

    fn render_bet_changed(&self, old: u64, new: u64) {
        (**self).render_bet_changed(old, new)
    }

    fn render_spin_started(&self) {
        (**self).render_spin_started()
    }

    fn render_insufficient_credits(&self, credits: u64, bet: u64) {
        (**self).render_insufficient_credits(credits, bet)
    }

    fn render_no_credits(&self) {
        (**self).render_no_credits()
    }
}

/// Stops every reel immediately and ignores feedback
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantPresenter;

impl Presenter for InstantPresenter {
    fn render_reel_spin(&self, _reel: usize, _symbol: Symbol) -> ReelStop {
        let (done, stop) = reel_signal();
        done.complete();
        stop
    }
}

// ============ Recording Presenter ============

/// Notification as received by a presenter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    ReelSpin { reel: usize, symbol: Symbol },
    Outcome(WinResult),
    CreditsChanged { old: u64, new: u64 },
    BetChanged { old: u64, new: u64 },
    SpinStarted,
    InsufficientCredits { credits: u64, bet: u64 },
    NoCredits,
}

/// Stops every reel immediately and keeps a log of every notification
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the log so far
    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().clone()
    }

    /// Drain the log
    pub fn take_events(&self) -> Vec<PresenterEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn push(&self, event: PresenterEvent) {
        self.events.lock().push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn render_reel_spin(&self, reel: usize, symbol: Symbol) -> ReelStop {
        self.push(PresenterEvent::ReelSpin { reel, symbol });
        InstantPresenter.render_reel_spin(reel, symbol)
    }

    fn render_outcome(&self, win: &WinResult) {
        self.push(PresenterEvent::Outcome(win.clone()));
    }

    fn render_credits_changed(&self, old: u64, new: u64) {
        self.push(PresenterEvent::CreditsChanged { old, new });
    }

    fn render_bet_changed(&self, old: u64, new: u64) {
        self.push(PresenterEvent::BetChanged { old, new });
    }

    fn render_spin_started(&self) {
        self.push(PresenterEvent::SpinStarted);
    }

    fn render_insufficient_credits(&self, credits: u64, bet: u64) {
        self.push(PresenterEvent::InsufficientCredits { credits, bet });
    }

    fn render_no_credits(&self) {
        self.push(PresenterEvent::NoCredits);
    }
}

// ============ Timed Reels ============

/// Timer-driven reel stops for presenters without their own animation clock.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TimedReels {
    timing: TimingConfig,
    rng: Mutex<StdRng>,
}

impl TimedReels {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible jitter
    pub fn seeded(timing: TimingConfig, seed: u64) -> Self {
        Self {
            timing,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Draw the stop delay for `reel`
    pub fn delay_for(&self, reel: usize) -> std::time::Duration {
        let jitter: f64 = self.rng.lock().random();
        self.timing.reel_delay(reel, jitter)
    }

    /// Stop `reel` after its delay: run `on_stop`, then fire the signal
    pub fn schedule<F>(&self, reel: usize, on_stop: F) -> ReelStop
    where
        F: FnOnce() + Send + 'static,
    {
        let (done, stop) = reel_signal();
        let delay = self.delay_for(reel);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_stop();
            done.complete();
        });
        stop
    }
}
