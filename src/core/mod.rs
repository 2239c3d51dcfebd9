//! Core domain types for the ticket desk
//!
//! These types mirror the logical shapes exchanged with the ticket service.
//! Enumerations serialize in the service's `snake_case` wire form.

mod builders;
mod draft;
mod filter;
mod stats;
mod ticket;
mod types;

pub use builders::TicketBuilder;
pub use draft::{DEFAULT_TITLE_MAX_LEN, DraftField, TicketDraft};
pub use filter::FilterCriteria;
pub use stats::{ClassificationSuggestion, StatsSnapshot};
pub use ticket::{NewTicket, Ticket, TicketId, TicketPatch};
pub use types::{Category, Priority, Status};
