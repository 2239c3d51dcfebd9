//! Ticket collection synchronizer
//!
//! Keeps the local ticket list consistent with the remote store while filters
//! change underneath it. Every fetch is tagged by the collection's own
//! [`GenerationClock`]; a response is applied only if no newer fetch has been
//! issued since.

use super::{GenerationClock, lock};
use crate::api::TicketStore;
use crate::core::{FilterCriteria, Status, Ticket, TicketId, TicketPatch};
use crate::error::{Result, TicketDeskError};
use crate::integration::EventBus;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load tickets. Please try again.";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update ticket status";

/// What a presentation layer renders for the ticket list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionView {
    pub tickets: Vec<Ticket>,
    /// Sequence of the fetch whose result is displayed, 0 before the first
    pub fetch_sequence: u64,
    /// True while the newest fetch is outstanding
    pub loading: bool,
    pub error: Option<String>,
}

impl CollectionView {
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }
}

/// How a completed fetch affected the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { count: usize },
    /// A newer fetch was issued before this one resolved
    Superseded,
}

/// Sole writer of the local ticket collection
#[derive(Clone)]
pub struct TicketCollectionSync {
    store: Arc<dyn TicketStore>,
    clock: Arc<GenerationClock>,
    filters: Arc<Mutex<FilterCriteria>>,
    view: Arc<watch::Sender<CollectionView>>,
    events: EventBus,
}

impl std::fmt::Debug for TicketCollectionSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketCollectionSync")
            .field("filters", &*lock(&self.filters))
            .field("latest_sequence", &self.clock.latest())
            .finish_non_exhaustive()
    }
}

impl TicketCollectionSync {
    pub fn new(store: Arc<dyn TicketStore>, events: EventBus) -> Self {
        let (view, _) = watch::channel(CollectionView::default());
        Self {
            store,
            clock: Arc::new(GenerationClock::new()),
            filters: Arc::new(Mutex::new(FilterCriteria::default())),
            view: Arc::new(view),
            events,
        }
    }

    /// Replace the filter criteria and fetch with them
    pub async fn set_filters(&self, criteria: FilterCriteria) -> Result<FetchOutcome> {
        debug!(?criteria, "Filters changed");
        let (filters, seq) = {
            let mut current = lock(&self.filters);
            *current = criteria;
            (current.clone(), self.clock.next())
        };
        self.fetch(filters, seq).await
    }

    /// Fetch with the current criteria.
    ///
    /// A superseded response, successful or not, changes nothing and yields
    /// [`FetchOutcome::Superseded`]. A current failure keeps the displayed
    /// tickets, records an error message and returns the error.
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let (filters, seq) = {
            let current = lock(&self.filters);
            (current.clone(), self.clock.next())
        };
        self.fetch(filters, seq).await
    }

    /// Criteria and sequence are taken under the filters lock, so a higher
    /// sequence always carries the newer criteria.
    async fn fetch(&self, filters: FilterCriteria, seq: u64) -> Result<FetchOutcome> {
        self.view.send_if_modified(|v| {
            if !self.clock.is_latest(seq) {
                return false;
            }
            v.loading = true;
            v.error = None;
            true
        });
        debug!(seq, "Fetching tickets");

        match self.store.list_tickets(&filters).await {
            Ok(tickets) => {
                let count = tickets.len();
                let applied = self.view.send_if_modified(|v| {
                    if !self.is_current(seq, v) {
                        return false;
                    }
                    v.tickets = tickets;
                    v.fetch_sequence = seq;
                    v.loading = false;
                    true
                });
                if applied {
                    debug!(seq, count, "Applied ticket list");
                    Ok(FetchOutcome::Applied { count })
                } else {
                    debug!(seq, latest = self.clock.latest(), "Discarding superseded ticket list");
                    Ok(FetchOutcome::Superseded)
                }
            },
            Err(e) => {
                let current = self.view.send_if_modified(|v| {
                    if !self.is_current(seq, v) {
                        return false;
                    }
                    v.loading = false;
                    v.error = Some(LOAD_FAILED_MESSAGE.to_string());
                    true
                });
                if current {
                    warn!(seq, error = %e, "Ticket fetch failed");
                    Err(e)
                } else {
                    debug!(seq, error = %e, "Ignoring failure of superseded fetch");
                    Ok(FetchOutcome::Superseded)
                }
            },
        }
    }

    /// Change a ticket's status optimistically.
    ///
    /// The new status is visible before the store confirms it. If the store
    /// rejects the change the recorded previous status is put back verbatim
    /// and the error is returned. With concurrent updates to one ticket the
    /// last rollback wins.
    pub async fn update_status(&self, id: TicketId, status: Status) -> Result<Ticket> {
        let mut previous = None;
        self.view.send_if_modified(|v| {
            let Some(ticket) = v.tickets.iter_mut().find(|t| t.id == id) else {
                return false;
            };
            previous = Some(ticket.status);
            ticket.status = status;
            true
        });
        let Some(previous) = previous else {
            return Err(TicketDeskError::TicketNotFound { id });
        };
        debug!(%id, from = %previous, to = %status, "Applied optimistic status");

        match self.store.update_ticket(id, &TicketPatch::status(status)).await {
            Ok(ticket) => {
                info!(%id, from = %previous, to = %status, "Status update confirmed");
                self.events.notify_status_changed(id, previous, status);
                Ok(ticket)
            },
            Err(e) => {
                self.view.send_modify(|v| {
                    if let Some(ticket) = v.tickets.iter_mut().find(|t| t.id == id) {
                        ticket.status = previous;
                    }
                    v.error = Some(UPDATE_FAILED_MESSAGE.to_string());
                });
                warn!(%id, attempted = %status, restored = %previous, error = %e, "Status update failed; rolled back");
                self.events
                    .notify_status_reverted(id, status, previous, e.user_message());
                Err(e)
            },
        }
    }

    /// Load one ticket straight from the store without touching the view
    pub async fn fetch_ticket(&self, id: TicketId) -> Result<Ticket> {
        self.store.get_ticket(id).await
    }

    /// Make sure `id` is in the view so its status can be changed.
    ///
    /// A ticket the last list did not include (another page, another filter)
    /// is fetched individually and appended. The next refresh replaces it
    /// along with everything else.
    pub async fn ensure_loaded(&self, id: TicketId) -> Result<Ticket> {
        if let Some(ticket) = self.view.borrow().ticket(id) {
            return Ok(ticket.clone());
        }

        let ticket = self.store.get_ticket(id).await?;
        self.view.send_modify(|v| {
            if let Some(existing) = v.tickets.iter_mut().find(|t| t.id == id) {
                *existing = ticket.clone();
            } else {
                v.tickets.push(ticket.clone());
            }
        });
        debug!(%id, "Loaded ticket outside the current list");
        Ok(ticket)
    }

    #[must_use]
    pub fn filters(&self) -> FilterCriteria {
        lock(&self.filters).clone()
    }

    #[must_use]
    pub fn view(&self) -> CollectionView {
        self.view.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CollectionView> {
        self.view.subscribe()
    }

    fn is_current(&self, seq: u64, view: &CollectionView) -> bool {
        self.clock.is_latest(seq) && seq > view.fetch_sequence
    }
}
