//! End-to-end spin flow tests
//!
//! Drives the machine through real presenters: reels that only stop when the
//! test says so, instant reels, and timer-driven reels on a paused clock.

use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use jf_slot::*;
use jf_state::{FileStore, MemoryStore, SnapshotStore, StoreResult};

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Holds every reel until released
#[derive(Default)]
struct ManualPresenter {
    pending: Mutex<Vec<ReelDone>>,
}

impl ManualPresenter {
    fn held(&self) -> usize {
        self.pending.lock().len()
    }

    fn release_all(&self) {
        for done in self.pending.lock().drain(..) {
            done.complete();
        }
    }

    fn drop_all(&self) {
        self.pending.lock().clear();
    }
}

impl Presenter for ManualPresenter {
    fn render_reel_spin(&self, _reel: usize, _symbol: Symbol) -> ReelStop {
        let (done, stop) = reel_signal();
        self.pending.lock().push(done);
        stop
    }
}

fn manual_machine(config: SlotConfig) -> SlotMachine<Arc<ManualPresenter>> {
    SlotMachineBuilder::new()
        .config(config)
        .seed(7)
        .build(Arc::new(ManualPresenter::default()))
        .unwrap()
}

/// Let spawned tasks run until the reels are handed out
async fn wait_for_reels(presenter: &ManualPresenter, count: usize) {
    while presenter.held() < count {
        tokio::task::yield_now().await;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_forced_jackpot_from_fresh_session() {
    let machine = SlotMachine::new(InstantPresenter).unwrap();
    machine.force_jackpot();

    let record = machine.trigger_spin().await.unwrap();
    assert_eq!(record.win.kind, WinKind::Jackpot);
    assert_eq!(record.win.amount, 50);

    let snap = machine.snapshot();
    assert_eq!(snap.credits, 149);
    assert_eq!(snap.total_wins, 1);
    assert_eq!(snap.biggest_win, 50);
}

#[tokio::test]
async fn test_broke_session_refuses_spin() {
    let machine = SlotMachine::new(InstantPresenter).unwrap();
    machine.set_credits(0);
    for _ in 0..3 {
        assert!(matches!(
            machine.trigger_spin().await,
            Err(SlotError::InsufficientCredits { credits: 0, .. })
        ));
    }
    let snap = machine.snapshot();
    assert_eq!(snap.credits, 0);
    assert_eq!(snap.total_spins, 0);
    assert!(!machine.is_spinning());
}

/// Records whether the machine reported a spin while refusing one
#[derive(Default)]
struct RefusalWatcher {
    machine: OnceLock<Weak<SlotMachine<Arc<RefusalWatcher>>>>,
    spinning_at_refusal: Mutex<Vec<bool>>,
}

impl Presenter for RefusalWatcher {
    fn render_reel_spin(&self, reel: usize, symbol: Symbol) -> ReelStop {
        InstantPresenter.render_reel_spin(reel, symbol)
    }

    fn render_insufficient_credits(&self, _credits: u64, _bet: u64) {
        if let Some(machine) = self.machine.get().and_then(Weak::upgrade) {
            self.spinning_at_refusal.lock().push(machine.is_spinning());
        }
    }
}

#[tokio::test]
async fn test_refused_spin_never_shows_as_spinning() {
    let presenter = Arc::new(RefusalWatcher::default());
    let machine = Arc::new(
        SlotMachineBuilder::new()
            .build(Arc::clone(&presenter))
            .unwrap(),
    );
    presenter.machine.set(Arc::downgrade(&machine)).unwrap();
    machine.set_credits(0);

    for _ in 0..3 {
        assert!(machine.trigger_spin().await.is_err());
    }
    assert_eq!(*presenter.spinning_at_refusal.lock(), vec![false; 3]);
    assert!(!machine.is_spinning());
}

#[tokio::test]
async fn test_counters_saturate_on_restored_session() {
    let persistence = Persistence::in_memory("saturated");
    persistence
        .store()
        .write(
            persistence.key(),
            r#"{"credits":100,"totalSpins":18446744073709551615,"totalWins":18446744073709551615}"#,
        )
        .unwrap();
    let machine = SlotMachineBuilder::new()
        .persistence(persistence)
        .build(InstantPresenter)
        .unwrap();
    assert_eq!(machine.snapshot().total_spins, u64::MAX);

    machine.force_jackpot();
    let record = machine.trigger_spin().await.unwrap();
    assert_eq!(record.credits_after, 149);
    machine.force_loss();
    machine.trigger_spin().await.unwrap();

    let snap = machine.snapshot();
    assert_eq!(snap.total_spins, u64::MAX);
    assert_eq!(snap.total_wins, u64::MAX);
    assert_eq!(snap.biggest_win, 50);
}

#[tokio::test]
async fn test_conservation_over_many_spins() {
    let machine = SlotMachineBuilder::new()
        .seed(2024)
        .build(InstantPresenter)
        .unwrap();
    machine.set_credits(10_000);

    for i in 0..500 {
        machine.change_bet(if i % 7 == 0 { -3 } else { 1 });
        let record = machine.trigger_spin().await.unwrap();
        assert_eq!(
            record.credits_after,
            record.credits_before - record.bet + record.win.amount
        );

        let snap = machine.snapshot();
        let limits = machine.config().bet_limits;
        assert!(snap.bet >= limits.min && snap.bet <= limits.max);
        assert!(snap.bet <= snap.credits.max(1));
    }

    let snap = machine.snapshot();
    assert_eq!(snap.total_spins, 500);
    assert!(snap.total_wins <= snap.total_spins);
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXCLUSIVITY
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_second_trigger_is_ignored_while_spinning() {
    let machine = Arc::new(manual_machine(SlotConfig::default()));
    machine.force_loss();

    let spinning = {
        let machine = Arc::clone(&machine);
        tokio::spawn(async move { machine.trigger_spin().await })
    };
    wait_for_reels(machine.presenter(), REEL_COUNT).await;

    assert!(machine.is_spinning());
    assert_eq!(machine.phase(), SpinPhase::Deducting);
    let during = machine.snapshot();
    assert_eq!(during.credits, 99);

    assert_eq!(machine.trigger_spin().await, Err(SlotError::SpinInProgress));
    assert_eq!(machine.snapshot(), during);
    assert_eq!(machine.presenter().held(), REEL_COUNT);

    machine.presenter().release_all();
    let record = spinning.await.unwrap().unwrap();
    assert_eq!(record.outcome.indices(), [0, 1, 2]);
    assert_eq!(machine.snapshot().total_spins, 1);
    assert!(!machine.is_spinning());

    // Guard released: the next trigger is accepted
    machine.force_win();
    let next = {
        let machine = Arc::clone(&machine);
        tokio::spawn(async move { machine.trigger_spin().await })
    };
    wait_for_reels(machine.presenter(), REEL_COUNT).await;
    machine.presenter().release_all();
    assert!(next.await.unwrap().unwrap().win.is_win());
}

#[tokio::test]
async fn test_bet_changes_during_spin_apply_to_next_spin() {
    let machine = Arc::new(manual_machine(SlotConfig::default()));
    machine.force_win();

    let spinning = {
        let machine = Arc::clone(&machine);
        tokio::spawn(async move { machine.trigger_spin().await })
    };
    wait_for_reels(machine.presenter(), REEL_COUNT).await;

    assert!(machine.change_bet(4).is_changed());
    machine.grant_credits(10);
    assert!(machine.reset().is_err());

    machine.presenter().release_all();
    let record = spinning.await.unwrap().unwrap();
    // Paid on the bet captured at acceptance
    assert_eq!(record.bet, 1);
    assert_eq!(record.win.amount, 50);
    assert_eq!(machine.snapshot().credits, 100 - 1 + 10 + 50);
    assert_eq!(machine.snapshot().bet, 5);
}

#[tokio::test]
async fn test_dropped_reel_signals_count_as_stopped() {
    let machine = Arc::new(manual_machine(SlotConfig::default()));
    let spinning = {
        let machine = Arc::clone(&machine);
        tokio::spawn(async move { machine.trigger_spin().await })
    };
    wait_for_reels(machine.presenter(), REEL_COUNT).await;
    machine.presenter().drop_all();

    let record = spinning.await.unwrap().unwrap();
    assert!(!record.timed_out);
    assert_eq!(machine.snapshot().total_spins, 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIMING
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test(start_paused = true)]
async fn test_reel_timeout_settles_spin() {
    let config = SlotConfig {
        reel_timeout_ms: Some(5_000),
        ..SlotConfig::default()
    };
    let machine = manual_machine(config);
    machine.force_jackpot();

    // Nobody ever releases the reels
    let record = machine.trigger_spin().await.unwrap();
    assert!(record.timed_out);
    assert_eq!(record.credits_after, 149);
    assert!(!machine.is_spinning());
    assert_eq!(machine.phase(), SpinPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_spin_is_still_settled() {
    let persistence = Persistence::in_memory("abandoned");
    let machine = SlotMachineBuilder::new()
        .persistence(persistence.clone())
        .seed(7)
        .build(Arc::new(ManualPresenter::default()))
        .unwrap();
    machine.force_jackpot();

    // The host gives up on reels that never stop
    let waited = tokio::time::timeout(Duration::from_secs(10), machine.trigger_spin()).await;
    assert!(waited.is_err());

    let snap = machine.snapshot();
    assert_eq!(snap.credits, 149);
    assert_eq!(snap.total_spins, 1);
    assert_eq!(snap.total_wins, 1);
    assert_eq!(snap.biggest_win, 50);
    assert!(!machine.is_spinning());
    assert_eq!(machine.phase(), SpinPhase::Idle);
    assert_eq!(persistence.load(&SessionSnapshot::new(0, 1)).credits, 149);

    // Guard released: the next spin runs normally
    machine.force_loss();
    let next = machine.trigger_spin();
    tokio::pin!(next);
    tokio::select! {
        _ = &mut next => panic!("reels are still held"),
        _ = wait_for_reels(machine.presenter(), 2 * REEL_COUNT) => {}
    }
    machine.presenter().release_all();
    let record = next.await.unwrap();
    assert_eq!(record.credits_after, 148);
    assert_eq!(machine.snapshot().total_spins, 2);
}

/// Timer-driven presenter, like a terminal host uses
struct TimedPresenter {
    reels: TimedReels,
    stopped: Arc<Mutex<Vec<(usize, Symbol)>>>,
}

impl Presenter for TimedPresenter {
    fn render_reel_spin(&self, reel: usize, symbol: Symbol) -> ReelStop {
        let stopped = Arc::clone(&self.stopped);
        self.reels
            .schedule(reel, move || stopped.lock().push((reel, symbol)))
    }
}

#[tokio::test(start_paused = true)]
async fn test_timed_reels_settle_after_animation() {
    let stopped = Arc::new(Mutex::new(Vec::new()));
    let presenter = TimedPresenter {
        reels: TimedReels::seeded(TimingConfig::normal(), 5),
        stopped: Arc::clone(&stopped),
    };
    let machine = SlotMachineBuilder::new().seed(5).build(presenter).unwrap();

    let start = tokio::time::Instant::now();
    let record = machine.trigger_spin().await.unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(1500));
    assert!(elapsed <= TimingConfig::normal().longest_spin(REEL_COUNT));

    let mut landed = stopped.lock().clone();
    landed.sort();
    let expected: Vec<_> = record.outcome.symbols.iter().copied().enumerate().collect();
    assert_eq!(landed, expected);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PERSISTENCE
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_session_survives_restart() {
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
    let persistence = Persistence::new(Arc::clone(&store), "round-trip");

    let first = SlotMachineBuilder::new()
        .persistence(persistence.clone())
        .seed(11)
        .build(InstantPresenter)
        .unwrap();
    first.force_jackpot();
    first.trigger_spin().await.unwrap();
    first.force_loss();
    first.trigger_spin().await.unwrap();
    first.set_bet(3);
    first.set_language(Language::English);
    let before = first.snapshot();
    drop(first);

    let second = SlotMachineBuilder::new()
        .persistence(persistence)
        .build(InstantPresenter)
        .unwrap();
    assert_eq!(second.snapshot(), before);
    assert_eq!(second.preferences().language, Language::English);
}

/// Keeps every write in order
#[derive(Default)]
struct HistoryStore {
    writes: Mutex<Vec<String>>,
}

impl SnapshotStore for HistoryStore {
    fn read(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(self.writes.lock().last().cloned())
    }

    fn write(&self, _key: &str, value: &str) -> StoreResult<()> {
        self.writes.lock().push(value.to_string());
        Ok(())
    }

    fn remove(&self, _key: &str) -> StoreResult<()> {
        self.writes.lock().clear();
        Ok(())
    }
}

#[test]
fn test_last_save_matches_final_state_under_concurrent_mutation() {
    let store = Arc::new(HistoryStore::default());
    let machine = SlotMachineBuilder::new()
        .persistence(Persistence::new(store.clone(), "ordered"))
        .build(InstantPresenter)
        .unwrap();

    std::thread::scope(|scope| {
        for t in 0..4 {
            let machine = &machine;
            scope.spawn(move || {
                for i in 0..250 {
                    if (i + t) % 5 == 0 {
                        machine.toggle_preference(Toggle::Sound);
                    } else {
                        machine.grant_credits(1);
                    }
                }
            });
        }
    });

    let last = store.writes.lock().last().cloned().unwrap();
    let saved = SessionSnapshot::from_json(&last, &SessionSnapshot::new(0, 1));
    assert_eq!(saved, machine.session_snapshot());
    assert_eq!(saved.credits, 100 + 4 * 200);
}

#[tokio::test]
async fn test_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = Persistence::new(Arc::new(FileStore::new(dir.path())), "justfun-slot-v1");

    let machine = SlotMachineBuilder::new()
        .persistence(persistence.clone())
        .build(InstantPresenter)
        .unwrap();
    machine.grant_credits(25);
    machine.toggle_preference(Toggle::Vibration);

    let stored = persistence.load(&SessionSnapshot::new(0, 1));
    assert_eq!(stored.credits, 125);
    assert!(!stored.preferences.vibration);
    assert!(dir.path().join("justfun-slot-v1.json").exists());
}
