//! In-process ticket service
//!
//! Applies the same filter and stats rules as the remote service so the desk
//! can run without a network, mainly in tests.

use super::{Classifier, TicketStore};
use crate::core::{
    ClassificationSuggestion, FilterCriteria, NewTicket, StatsSnapshot, Status, Ticket, TicketId,
    TicketPatch,
};
use crate::error::{Result, TicketDeskError};
use crate::sync::lock;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Mutex;

/// Operations that can be switched to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    List,
    Get,
    Create,
    Update,
    Stats,
    Classify,
}

#[derive(Debug, Default)]
struct State {
    tickets: Vec<Ticket>,
    next_id: u64,
    failing: HashSet<StoreOperation>,
    suggestion: ClassificationSuggestion,
}

#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    state: Mutex<State>,
}

impl InMemoryTicketStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store; IDs of later creations continue after the highest one
    #[must_use]
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let next_id = tickets.iter().map(|t| t.id.get()).max().unwrap_or(0);
        Self {
            state: Mutex::new(State {
                tickets,
                next_id,
                ..State::default()
            }),
        }
    }

    /// Answer every classification with `suggestion`
    pub fn set_suggestion(&self, suggestion: ClassificationSuggestion) {
        lock(&self.state).suggestion = suggestion;
    }

    pub fn set_failing(&self, operation: StoreOperation, failing: bool) {
        let mut state = lock(&self.state);
        if failing {
            state.failing.insert(operation);
        } else {
            state.failing.remove(&operation);
        }
    }

    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        lock(&self.state).tickets.clone()
    }

    fn check(state: &State, operation: StoreOperation) -> Result<()> {
        if state.failing.contains(&operation) {
            return Err(TicketDeskError::Api {
                status: 503,
                detail: Some(format!("{operation:?} unavailable")),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn list_tickets(&self, filters: &FilterCriteria) -> Result<Vec<Ticket>> {
        let state = lock(&self.state);
        Self::check(&state, StoreOperation::List)?;
        let mut tickets: Vec<Ticket> = state
            .tickets
            .iter()
            .filter(|t| filters.matches(t))
            .cloned()
            .collect();
        // Newest first, like the remote service
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tickets)
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Ticket> {
        let state = lock(&self.state);
        Self::check(&state, StoreOperation::Get)?;
        state
            .tickets
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(TicketDeskError::TicketNotFound { id })
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        let mut state = lock(&self.state);
        Self::check(&state, StoreOperation::Create)?;
        state.next_id += 1;
        let created = Ticket {
            id: TicketId::new(state.next_id),
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            category: ticket.category,
            priority: ticket.priority,
            status: Status::Open,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.tickets.push(created.clone());
        Ok(created)
    }

    async fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<Ticket> {
        let mut state = lock(&self.state);
        Self::check(&state, StoreOperation::Update)?;
        let ticket = state
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TicketDeskError::TicketNotFound { id })?;
        if let Some(status) = patch.status {
            ticket.status = status;
        }
        ticket.updated_at = Some(Utc::now());
        Ok(ticket.clone())
    }

    async fn get_stats(&self) -> Result<StatsSnapshot> {
        let state = lock(&self.state);
        Self::check(&state, StoreOperation::Stats)?;
        Ok(StatsSnapshot::from_tickets(&state.tickets, Utc::now()))
    }
}

#[async_trait]
impl Classifier for InMemoryTicketStore {
    async fn classify(&self, _description: &str) -> Result<ClassificationSuggestion> {
        let state = lock(&self.state);
        Self::check(&state, StoreOperation::Classify)?;
        Ok(state.suggestion)
    }
}
