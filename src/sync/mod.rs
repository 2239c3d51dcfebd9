//! Asynchronous state synchronization
//!
//! All components follow the same rule: every asynchronous request is tagged
//! with a generation or sequence number when it is issued, and its result is
//! applied only if that tag is still current when it completes. In-flight
//! calls are never aborted; superseded ones simply have no effect.
//!
//! Components publish their state through `tokio::sync::watch` channels so a
//! presentation layer can render the latest value or await changes.

pub mod clock;
pub mod collection;
pub mod debounce;
pub mod draft;
pub mod stats;

pub use clock::GenerationClock;
pub use collection::{CollectionView, FetchOutcome, TicketCollectionSync};
pub use debounce::{ClassificationDebouncer, ClassificationRequest, DebouncePhase, DebounceSettings};
pub use draft::{DraftManager, FormMessage, SubmitState};
pub use stats::{PollOutcome, StatsHandle, StatsPoller, StatsView};

use crate::core::TicketDraft;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Draft cell shared between the draft manager and the debouncer
pub type SharedDraft = Arc<watch::Sender<TicketDraft>>;

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
