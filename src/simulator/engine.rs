use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::random::{ChaChaSource, RandomSource};
use super::seed::base_price;
use super::walk::{random_step, DEFAULT_VOLATILITY};
use crate::model::price::{PriceState, PriceTable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatorSettings {
    pub tick_interval: Duration,
    pub volatility: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            volatility: DEFAULT_VOLATILITY,
        }
    }
}

struct SimState {
    prices: PriceTable,
    active: Vec<String>,
    random: Box<dyn RandomSource>,
    stopped: bool,
    tick_count: u64,
}

impl SimState {
    /// Seeds tickers never seen before and replaces the active set.
    /// Returns how many tickers were seeded.
    fn reconcile(&mut self, tickers: Vec<String>) -> usize {
        let mut seeded = 0;
        for ticker in &tickers {
            if !self.prices.contains_key(ticker) {
                let price = base_price(ticker, self.random.as_mut());
                self.prices.insert(ticker.clone(), PriceState::seeded(price));
                seeded += 1;
            }
        }
        self.active = tickers;
        seeded
    }

    fn advance(&mut self, volatility: f64) -> usize {
        let mut moved = 0;
        for ticker in &self.active {
            if let Some(state) = self.prices.get_mut(ticker) {
                *state = random_step(state, volatility, self.random.as_mut());
                moved += 1;
            }
        }
        self.tick_count += 1;
        moved
    }
}

struct Shared {
    state: Mutex<SimState>,
    snapshot_tx: watch::Sender<PriceTable>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// One critical section: advance every active ticker and publish.
    /// `None` once the engine is stopped.
    fn tick(&self, volatility: f64) -> Option<usize> {
        let mut state = self.lock();
        if state.stopped {
            return None;
        }
        let moved = state.advance(volatility);
        self.snapshot_tx.send_replace(state.prices.clone());
        tracing::trace!(tick = state.tick_count, moved, "price tick");
        Some(moved)
    }
}

/// Owns the simulated price table and the single shared tick source for one
/// client session.
pub struct SimulationEngine {
    shared: Arc<Shared>,
    settings: SimulatorSettings,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SimulationEngine {
    pub fn new(settings: SimulatorSettings) -> Self {
        Self::with_random(settings, Box::new(ChaChaSource::from_entropy()))
    }

    pub fn with_random(settings: SimulatorSettings, random: Box<dyn RandomSource>) -> Self {
        let (snapshot_tx, _) = watch::channel(PriceTable::new());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SimState {
                    prices: PriceTable::new(),
                    active: Vec::new(),
                    random,
                    stopped: false,
                    tick_count: 0,
                }),
                snapshot_tx,
            }),
            settings,
            timer: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> SimulatorSettings {
        self.settings
    }

    /// Replaces the active subscription set with `tickers` (a full set, not a
    /// delta). Unseen tickers are seeded, known ones keep their state, and the
    /// tick source is armed if a tokio runtime is available.
    pub fn set_subscriptions<S: AsRef<str>>(&self, tickers: &[S]) {
        let tickers = normalize_tickers(tickers);
        {
            let mut state = self.shared.lock();
            if state.stopped {
                tracing::debug!("ignoring subscription change on stopped simulator");
                return;
            }
            let seeded = state.reconcile(tickers);
            self.shared.snapshot_tx.send_replace(state.prices.clone());
            tracing::debug!(active = ?state.active, seeded, "subscriptions updated");
        }
        self.ensure_running();
    }

    /// Advances every active ticker once. Returns the number of tickers moved;
    /// zero after `stop`.
    pub fn tick(&self) -> usize {
        self.shared.tick(self.settings.volatility).unwrap_or(0)
    }

    pub fn prices(&self) -> PriceTable {
        self.shared.lock().prices.clone()
    }

    pub fn price(&self, ticker: &str) -> Option<PriceState> {
        self.shared
            .lock()
            .prices
            .get(&ticker.trim().to_ascii_uppercase())
            .copied()
    }

    pub fn active_tickers(&self) -> Vec<String> {
        self.shared.lock().active.clone()
    }

    pub fn tick_count(&self) -> u64 {
        self.shared.lock().tick_count
    }

    /// Receives a fresh table after every tick and subscription change.
    pub fn subscribe(&self) -> watch::Receiver<PriceTable> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        lock_timer(&self.timer)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.lock().stopped
    }

    /// Cancels the tick source. Idempotent; no tick mutates state once this
    /// returns.
    pub fn stop(&self) {
        let (was_live, ticks) = {
            let mut state = self.shared.lock();
            let was_live = !state.stopped;
            state.stopped = true;
            (was_live, state.tick_count)
        };
        if let Some(handle) = lock_timer(&self.timer).take() {
            handle.abort();
        }
        if was_live {
            tracing::info!(ticks, "price simulator stopped");
        }
    }

    fn ensure_running(&self) {
        let mut timer = lock_timer(&self.timer);
        if timer.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        if self.shared.lock().stopped {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let shared = Arc::clone(&self.shared);
                let settings = self.settings;
                *timer = Some(runtime.spawn(run_ticker(shared, settings)));
                tracing::info!(
                    interval_ms = settings.tick_interval.as_millis() as u64,
                    "price simulator armed"
                );
            }
            Err(_) => {
                tracing::debug!("no tokio runtime, simulator ticks are driven manually");
            }
        }
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticker(shared: Arc<Shared>, settings: SimulatorSettings) {
    let first = tokio::time::Instant::now() + settings.tick_interval;
    let mut interval = tokio::time::interval_at(first, settings.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if shared.tick(settings.volatility).is_none() {
            break;
        }
    }
}

fn lock_timer(timer: &Mutex<Option<JoinHandle<()>>>) -> MutexGuard<'_, Option<JoinHandle<()>>> {
    timer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Trims, uppercases and de-duplicates (first occurrence wins). Empty entries
/// are dropped.
pub fn normalize_tickers<S: AsRef<str>>(tickers: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(tickers.len());
    for raw in tickers {
        let ticker = raw.as_ref().trim().to_ascii_uppercase();
        if ticker.is_empty() || !seen.insert(ticker.clone()) {
            continue;
        }
        out.push(ticker);
    }
    out
}
