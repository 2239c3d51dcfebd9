//! Desk event bus and composition root
//!
//! Components announce what they did on a broadcast [`EventBus`]. The refresh
//! bridge listens for created tickets and turns them into the "something
//! changed" signal that refetches the collection and the stats.

use crate::api::{Classifier, TicketStore};
use crate::config::Config;
use crate::core::{Status, Ticket, TicketId};
use crate::sync::{
    DebounceSettings, DraftManager, StatsHandle, StatsPoller, TicketCollectionSync,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 100;

/// Event types published by the desk components
#[derive(Debug, Clone)]
pub enum DeskEvent {
    TicketCreated {
        ticket: Ticket,
    },
    StatusChanged {
        ticket_id: TicketId,
        old_status: Status,
        new_status: Status,
    },
    /// An optimistic status change was rejected and undone
    StatusReverted {
        ticket_id: TicketId,
        attempted: Status,
        restored: Status,
        message: String,
    },
}

/// Broadcast channel shared by all components of one desk
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DeskEvent>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sender", &"broadcast::Sender<DeskEvent>")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Get an event receiver
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.sender.subscribe()
    }

    /// Notify about a ticket creation
    pub fn notify_ticket_created(&self, ticket: &Ticket) {
        let _ = self.sender.send(DeskEvent::TicketCreated {
            ticket: ticket.clone(),
        });
        tracing::info!("Desk: Ticket created - {}", ticket.id);
    }

    /// Notify about a confirmed status change
    pub fn notify_status_changed(&self, ticket_id: TicketId, old_status: Status, new_status: Status) {
        let _ = self.sender.send(DeskEvent::StatusChanged {
            ticket_id,
            old_status,
            new_status,
        });
        tracing::info!(
            "Desk: Status changed - {} from {} to {}",
            ticket_id,
            old_status,
            new_status
        );
    }

    /// Notify about a rolled-back status change
    pub fn notify_status_reverted(
        &self,
        ticket_id: TicketId,
        attempted: Status,
        restored: Status,
        message: String,
    ) {
        let _ = self.sender.send(DeskEvent::StatusReverted {
            ticket_id,
            attempted,
            restored,
            message,
        });
        tracing::info!(
            "Desk: Status change reverted - {} back to {} (wanted {})",
            ticket_id,
            restored,
            attempted
        );
    }
}

/// Refetch the collection and the stats whenever a ticket is created.
///
/// Lagging behind the bus also triggers a refetch since a creation may have
/// been missed. Runs until aborted or the bus closes.
pub fn spawn_refresh_bridge(
    events: &EventBus,
    tickets: TicketCollectionSync,
    stats: StatsHandle,
) -> JoinHandle<()> {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(DeskEvent::TicketCreated { ticket }) => {
                    debug!(id = %ticket.id, "Refreshing after ticket creation");
                    refresh_all(&tickets, &stats).await;
                },
                Ok(_) => {},
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Refresh bridge lagged; refreshing");
                    refresh_all(&tickets, &stats).await;
                },
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn refresh_all(tickets: &TicketCollectionSync, stats: &StatsHandle) {
    // Failures are already recorded in the views.
    let (_, _) = tokio::join!(tickets.refresh(), stats.refresh_now());
}

/// One fully wired desk: draft, collection, stats and the bridge between them
pub struct TicketDesk {
    pub draft: DraftManager,
    pub tickets: TicketCollectionSync,
    pub stats: StatsPoller,
    events: EventBus,
    bridge: JoinHandle<()>,
}

impl std::fmt::Debug for TicketDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketDesk")
            .field("draft", &self.draft)
            .field("tickets", &self.tickets)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl TicketDesk {
    /// Wire the components together. Must be called inside a Tokio runtime.
    pub fn new(
        config: &Config,
        store: Arc<dyn TicketStore>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let events = EventBus::new();
        let draft = DraftManager::new(
            Arc::clone(&store),
            classifier,
            events.clone(),
            &config.draft,
            DebounceSettings::from(&config.classification),
        );
        let tickets = TicketCollectionSync::new(Arc::clone(&store), events.clone());
        let stats = StatsPoller::new(store, config.stats.poll_interval());
        let bridge = spawn_refresh_bridge(&events, tickets.clone(), stats.handle());
        Self {
            draft,
            tickets,
            stats,
            events,
            bridge,
        }
    }

    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }
}

impl Drop for TicketDesk {
    fn drop(&mut self) {
        self.bridge.abort();
        self.stats.stop();
        self.draft.debouncer().cancel();
    }
}
