//! Debounced classification of draft descriptions
//!
//! Each qualifying description edit cancels the pending timer and schedules a
//! new one. When a timer survives the quiet period the description snapshot is
//! sent to the classifier, tagged with the draft generation it was taken at.
//! The suggestion is applied only if the draft is still at that generation.

use super::{SharedDraft, lock};
use crate::api::Classifier;
use crate::config::ClassificationConfig;
use crate::core::ClassificationSuggestion;
use crate::error::Result;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle of the classification pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebouncePhase {
    #[default]
    Idle,
    /// A timer is waiting out the quiet period
    PendingDebounce,
    /// A request is awaiting the classifier
    Classifying,
}

/// Description snapshot captured when a timer is scheduled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub description: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceSettings {
    pub delay: Duration,
    /// Descriptions shorter than this many characters are never classified
    pub min_description_len: usize,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self::from(&ClassificationConfig::default())
    }
}

impl From<&ClassificationConfig> for DebounceSettings {
    fn from(config: &ClassificationConfig) -> Self {
        Self {
            delay: config.debounce(),
            min_description_len: config.min_description_len,
        }
    }
}

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Schedule {
    timer: Option<PendingTimer>,
    in_flight: usize,
}

struct Inner {
    classifier: Arc<dyn Classifier>,
    draft: SharedDraft,
    settings: DebounceSettings,
    schedule: Mutex<Schedule>,
    phase: watch::Sender<DebouncePhase>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let schedule = self.schedule.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = schedule.timer.take() {
            timer.handle.abort();
            debug!(generation = timer.generation, "Debouncer dropped; timer cancelled");
        }
    }
}

/// Owns the timer and request bookkeeping for draft enrichment.
///
/// Cheap to clone; clones share the same schedule. Scheduling spawns onto the
/// current Tokio runtime. A pending timer does not keep the debouncer alive:
/// dropping the last clone cancels it.
#[derive(Clone)]
pub struct ClassificationDebouncer {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ClassificationDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassificationDebouncer")
            .field("settings", &self.inner.settings)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl ClassificationDebouncer {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        draft: SharedDraft,
        settings: DebounceSettings,
    ) -> Self {
        let (phase, _) = watch::channel(DebouncePhase::Idle);
        Self {
            inner: Arc::new(Inner {
                classifier,
                draft,
                settings,
                schedule: Mutex::new(Schedule::default()),
                phase,
            }),
        }
    }

    /// React to a description edit made at `generation`.
    ///
    /// Always cancels the pending timer. Schedules a new one only when the
    /// text is long enough to classify.
    pub fn on_description_changed(&self, text: &str, generation: u64) {
        let mut schedule = lock(&self.inner.schedule);
        Self::cancel_timer(&mut schedule);

        if text.chars().count() < self.inner.settings.min_description_len {
            debug!(generation, "Description below classification threshold");
            self.publish_phase(&schedule);
            return;
        }

        let request = ClassificationRequest {
            description: text.to_owned(),
            generation,
        };
        let delay = self.inner.settings.delay;
        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(this) = Self::upgrade(&weak) {
                this.fire(request).await;
            }
        });
        schedule.timer = Some(PendingTimer { generation, handle });
        debug!(generation, ?delay, "Scheduled classification");
        self.publish_phase(&schedule);
    }

    /// Drop any pending timer without scheduling a new one.
    ///
    /// Requests already sent to the classifier keep running; their results
    /// are discarded if the draft generation has moved on.
    pub fn cancel(&self) {
        let mut schedule = lock(&self.inner.schedule);
        Self::cancel_timer(&mut schedule);
        self.publish_phase(&schedule);
    }

    #[must_use]
    pub fn phase(&self) -> DebouncePhase {
        *self.inner.phase.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DebouncePhase> {
        self.inner.phase.subscribe()
    }

    /// Wait until no timer is pending and no request is outstanding
    pub async fn wait_until_idle(&self) {
        let mut phase = self.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = phase.wait_for(|p| *p == DebouncePhase::Idle).await;
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn cancel_timer(schedule: &mut Schedule) {
        if let Some(timer) = schedule.timer.take() {
            timer.handle.abort();
            debug!(generation = timer.generation, "Cancelled pending classification");
        }
    }

    async fn fire(&self, request: ClassificationRequest) {
        {
            let mut schedule = lock(&self.inner.schedule);
            let still_pending = schedule
                .timer
                .as_ref()
                .is_some_and(|t| t.generation == request.generation);
            if !still_pending {
                debug!(generation = request.generation, "Classification timer superseded");
                return;
            }
            // Detach our own handle so later edits cannot abort the request.
            schedule.timer = None;
            schedule.in_flight += 1;
            self.publish_phase(&schedule);
        }

        debug!(generation = request.generation, "Requesting classification");
        let outcome = self.inner.classifier.classify(&request.description).await;
        self.complete(request.generation, outcome);
    }

    fn complete(&self, generation: u64, outcome: Result<ClassificationSuggestion>) {
        match outcome {
            Ok(suggestion) => {
                let applied = self.inner.draft.send_if_modified(|draft| {
                    if draft.generation != generation {
                        return false;
                    }
                    draft.apply_suggestion(suggestion);
                    true
                });
                if applied {
                    info!(
                        generation,
                        category = %suggestion.category,
                        priority = %suggestion.priority,
                        "Applied classification suggestion"
                    );
                } else {
                    debug!(generation, "Discarding stale classification");
                }
            },
            Err(e) => warn!(generation, error = %e, "Classification failed; draft left unchanged"),
        }

        let mut schedule = lock(&self.inner.schedule);
        schedule.in_flight = schedule.in_flight.saturating_sub(1);
        self.publish_phase(&schedule);
    }

    fn publish_phase(&self, schedule: &Schedule) {
        let phase = if schedule.timer.is_some() {
            DebouncePhase::PendingDebounce
        } else if schedule.in_flight > 0 {
            DebouncePhase::Classifying
        } else {
            DebouncePhase::Idle
        };
        self.inner.phase.send_if_modified(|current| {
            if *current == phase {
                return false;
            }
            *current = phase;
            true
        });
    }
}
