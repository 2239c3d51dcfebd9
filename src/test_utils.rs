//! Test utilities for ticketdesk
//!
//! This module provides fake collaborators and fixtures shared by the unit
//! tests. Gated fakes hold every call open until the test resolves it, which
//! lets a test complete requests in any order it likes.

#![cfg(test)]

use crate::api::{Classifier, TicketStore};
use crate::core::{
    Category, ClassificationSuggestion, FilterCriteria, NewTicket, Priority, StatsSnapshot,
    Status, Ticket, TicketBuilder, TicketId, TicketPatch,
};
use crate::error::{Result, TicketDeskError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// Create a test ticket with default values
pub fn create_test_ticket(id: u64, title: &str, priority: Priority, status: Status) -> Ticket {
    TicketBuilder::new()
        .id(id)
        .title(title)
        .description(format!("Description for {title}"))
        .priority(priority)
        .status(status)
        .build()
}

pub fn suggestion(category: Category, priority: Priority) -> ClassificationSuggestion {
    ClassificationSuggestion { category, priority }
}

pub fn sample_stats(total: u64, open: u64) -> StatsSnapshot {
    StatsSnapshot {
        total_tickets: total,
        open_tickets: open,
        ..StatsSnapshot::default()
    }
}

/// Let spawned tasks run until they block
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// A call held open until the test answers it
pub struct Pending<Req, Resp> {
    pub request: Req,
    reply: oneshot::Sender<Result<Resp>>,
}

impl<Req, Resp> Pending<Req, Resp> {
    pub fn resolve(self, result: Result<Resp>) {
        let _ = self.reply.send(result);
    }

    pub fn succeed(self, value: Resp) {
        self.resolve(Ok(value));
    }

    pub fn fail(self, message: &str) {
        self.resolve(Err(TicketDeskError::Network(message.to_string())));
    }
}

pub type Calls<Req, Resp> = mpsc::UnboundedReceiver<Pending<Req, Resp>>;

/// Forwards each call to the test and waits for its answer
pub struct Gate<Req, Resp> {
    calls: mpsc::UnboundedSender<Pending<Req, Resp>>,
}

impl<Req, Resp> Gate<Req, Resp> {
    pub fn new() -> (Self, Calls<Req, Resp>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Self { calls }, rx)
    }

    pub async fn call(&self, request: Req) -> Result<Resp> {
        let (reply, response) = oneshot::channel();
        self.calls
            .send(Pending { request, reply })
            .map_err(|_| TicketDeskError::custom("test gate closed"))?;
        response
            .await
            .map_err(|_| TicketDeskError::Network("request abandoned".to_string()))?
    }
}

/// Ticket store whose every call waits on the test
pub struct GatedStore {
    lists: Gate<FilterCriteria, Vec<Ticket>>,
    creates: Gate<NewTicket, Ticket>,
    updates: Gate<(TicketId, TicketPatch), Ticket>,
    stats: Gate<(), StatsSnapshot>,
}

pub struct StoreCalls {
    pub lists: Calls<FilterCriteria, Vec<Ticket>>,
    pub creates: Calls<NewTicket, Ticket>,
    pub updates: Calls<(TicketId, TicketPatch), Ticket>,
    pub stats: Calls<(), StatsSnapshot>,
}

impl GatedStore {
    pub fn new() -> (Arc<Self>, StoreCalls) {
        let (lists, list_calls) = Gate::new();
        let (creates, create_calls) = Gate::new();
        let (updates, update_calls) = Gate::new();
        let (stats, stats_calls) = Gate::new();
        (
            Arc::new(Self {
                lists,
                creates,
                updates,
                stats,
            }),
            StoreCalls {
                lists: list_calls,
                creates: create_calls,
                updates: update_calls,
                stats: stats_calls,
            },
        )
    }
}

#[async_trait]
impl TicketStore for GatedStore {
    async fn list_tickets(&self, filters: &FilterCriteria) -> Result<Vec<Ticket>> {
        self.lists.call(filters.clone()).await
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Ticket> {
        Err(TicketDeskError::TicketNotFound { id })
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        self.creates.call(ticket.clone()).await
    }

    async fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<Ticket> {
        self.updates.call((id, patch.clone())).await
    }

    async fn get_stats(&self) -> Result<StatsSnapshot> {
        self.stats.call(()).await
    }
}

/// Classifier whose every call waits on the test
pub struct GatedClassifier {
    calls: Gate<String, ClassificationSuggestion>,
}

impl GatedClassifier {
    pub fn new() -> (Arc<Self>, Calls<String, ClassificationSuggestion>) {
        let (calls, rx) = Gate::new();
        (Arc::new(Self { calls }), rx)
    }
}

#[async_trait]
impl Classifier for GatedClassifier {
    async fn classify(&self, description: &str) -> Result<ClassificationSuggestion> {
        self.calls.call(description.to_string()).await
    }
}

/// Classifier that answers immediately and records what it was asked
pub struct RecordingClassifier {
    response: std::result::Result<ClassificationSuggestion, String>,
    calls: Mutex<Vec<String>>,
}

impl RecordingClassifier {
    pub fn new(response: std::result::Result<ClassificationSuggestion, String>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(Err(message.to_string()))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for RecordingClassifier {
    async fn classify(&self, description: &str) -> Result<ClassificationSuggestion> {
        self.calls.lock().unwrap().push(description.to_string());
        self.response
            .clone()
            .map_err(TicketDeskError::Network)
    }
}
