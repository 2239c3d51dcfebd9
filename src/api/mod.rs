//! Collaborator interfaces for the remote ticket service
//!
//! The desk never talks to the network directly; it goes through these
//! traits so that alternative transports and test doubles can be swapped in.

mod http;
pub mod memory;
pub mod wire;

pub use http::HttpTicketStore;
pub use memory::{InMemoryTicketStore, StoreOperation};

use crate::core::{
    ClassificationSuggestion, FilterCriteria, NewTicket, StatsSnapshot, Ticket, TicketId,
    TicketPatch,
};
use crate::error::Result;
use async_trait::async_trait;

/// Remote ticket store operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Lists tickets matching the filter criteria, in server order
    async fn list_tickets(&self, filters: &FilterCriteria) -> Result<Vec<Ticket>>;

    /// Loads a single ticket by ID
    async fn get_ticket(&self, id: TicketId) -> Result<Ticket>;

    /// Creates a ticket and returns it as stored
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket>;

    /// Applies a partial update
    async fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<Ticket>;

    /// Fetches aggregate statistics
    async fn get_stats(&self) -> Result<StatsSnapshot>;
}

/// Suggests a category and priority for free-text descriptions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, description: &str) -> Result<ClassificationSuggestion>;
}
