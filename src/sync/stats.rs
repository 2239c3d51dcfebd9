//! Periodic statistics polling
//!
//! At most one stats fetch is ever outstanding. A timer tick or manual refresh
//! that finds a fetch in flight is skipped, never queued.

use super::{GenerationClock, lock};
use crate::api::TicketStore;
use crate::core::StatsSnapshot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

pub const STATS_FAILED_MESSAGE: &str = "Failed to load statistics";

const MIN_POLL_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsView {
    /// Last successfully fetched snapshot; kept through failed cycles
    pub snapshot: Option<StatsSnapshot>,
    pub loading: bool,
    /// Set by a failed cycle, cleared when the next one starts
    pub error: Option<String>,
    pub fetch_sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Refreshed,
    /// Another fetch was already in flight
    Skipped,
    Failed,
}

struct Shared {
    store: Arc<dyn TicketStore>,
    clock: GenerationClock,
    view: watch::Sender<StatsView>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag even if the fetch future is dropped
struct InFlight<'a>(&'a Shared);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
        self.0.view.send_if_modified(|v| std::mem::replace(&mut v.loading, false));
    }
}

impl Shared {
    async fn refresh(&self, trigger: &'static str) -> PollOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(trigger, "Stats fetch already in flight; skipping");
            return PollOutcome::Skipped;
        }
        let _in_flight = InFlight(self);

        let seq = self.clock.next();
        self.view.send_modify(|v| {
            v.loading = true;
            v.error = None;
        });
        debug!(seq, trigger, "Fetching stats");

        match self.store.get_stats().await {
            Ok(snapshot) => {
                self.view.send_modify(|v| {
                    v.snapshot = Some(snapshot);
                    v.fetch_sequence = seq;
                    v.loading = false;
                });
                PollOutcome::Refreshed
            },
            Err(e) => {
                warn!(seq, error = %e, "Stats fetch failed; keeping previous snapshot");
                self.view.send_modify(|v| {
                    v.loading = false;
                    v.error = Some(STATS_FAILED_MESSAGE.to_string());
                });
                PollOutcome::Failed
            },
        }
    }
}

/// Owns the polling timer.
///
/// `start` and `stop` bracket the lifetime of whatever displays the stats.
/// Dropping the poller stops it as well.
pub struct StatsPoller {
    shared: Arc<Shared>,
    period: Duration,
    running: Mutex<Option<DropGuard>>,
}

impl std::fmt::Debug for StatsPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsPoller")
            .field("period", &self.period)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl StatsPoller {
    pub fn new(store: Arc<dyn TicketStore>, period: Duration) -> Self {
        let (view, _) = watch::channel(StatsView::default());
        Self {
            shared: Arc::new(Shared {
                store,
                clock: GenerationClock::new(),
                view,
                in_flight: AtomicBool::new(false),
            }),
            period: period.max(MIN_POLL_PERIOD),
            running: Mutex::new(None),
        }
    }

    /// Fetch immediately, then once per period until stopped.
    ///
    /// Calling `start` on a running poller does nothing.
    pub fn start(&self) {
        let mut running = lock(&self.running);
        if running.is_some() {
            debug!("Stats poller already running");
            return;
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let shared = Arc::clone(&self.shared);
        let period = self.period;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    () = cancelled.cancelled() => break,
                    _ = ticker.tick() => {},
                }
                tokio::select! {
                    () = cancelled.cancelled() => break,
                    _ = shared.refresh("timer") => {},
                }
            }
            debug!("Stats poll loop exited");
        });

        *running = Some(token.drop_guard());
        info!(?period, "Stats poller started");
    }

    /// Cancel the timer. A fetch in progress is abandoned.
    pub fn stop(&self) {
        if lock(&self.running).take().is_some() {
            info!("Stats poller stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.running).is_some()
    }

    /// Out-of-cycle fetch, skipped if one is already in flight
    pub async fn refresh_now(&self) -> PollOutcome {
        self.shared.refresh("manual").await
    }

    /// A cloneable handle for triggering refreshes from elsewhere
    #[must_use]
    pub fn handle(&self) -> StatsHandle {
        StatsHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    #[must_use]
    pub fn view(&self) -> StatsView {
        self.shared.view.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StatsView> {
        self.shared.view.subscribe()
    }
}

/// Refresh trigger that does not own the timer
#[derive(Clone)]
pub struct StatsHandle {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for StatsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsHandle").finish_non_exhaustive()
    }
}

impl StatsHandle {
    pub async fn refresh_now(&self) -> PollOutcome {
        self.shared.refresh("signal").await
    }

    #[must_use]
    pub fn view(&self) -> StatsView {
        self.shared.view.borrow().clone()
    }
}
