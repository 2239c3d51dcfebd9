//! ticketdesk - Support ticket desk client with AI-assisted triage
//!
//! This crate provides the client-side core of a support ticket desk:
//! - Drafting tickets with debounced, generation-checked classification
//! - A ticket collection that stays consistent under changing filters
//! - Optimistic status changes with rollback on failure
//! - Periodic statistics polling without overlapping fetches

// Allow missing error documentation for internal implementations
#![allow(clippy::missing_errors_doc)]
// Allow some pedantic lints that don't improve code quality
#![allow(clippy::option_if_let_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::map_unwrap_or)]

//! # Ordering
//!
//! Network calls are never aborted. Each one is tagged with the generation or
//! fetch sequence current when it was issued, and its result is dropped at
//! completion if a newer request has been made since. "Latest intent wins"
//! holds regardless of the order in which responses arrive.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticketdesk::api::HttpTicketStore;
//! use ticketdesk::config::Config;
//! use ticketdesk::core::DraftField;
//! use ticketdesk::integration::TicketDesk;
//!
//! let config = Config::load(None)?;
//! let store = Arc::new(HttpTicketStore::new(&config.api)?);
//! let desk = TicketDesk::new(&config, store.clone(), store);
//!
//! desk.draft.update_field(DraftField::Title("VPN drops".into()));
//! desk.draft.update_field(DraftField::Description("Disconnects every hour".into()));
//! desk.draft.debouncer().wait_until_idle().await;
//! let ticket = desk.draft.submit().await?;
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod integration;
pub mod sync;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{Result, TicketDeskError};
