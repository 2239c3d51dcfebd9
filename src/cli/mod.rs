//! Command-line interface for ticketdesk
//!
//! The CLI is a thin presentation layer: it builds a [`TicketDesk`] and calls
//! its operations, rendering the resulting state through [`OutputFormatter`].
//!
//! [`TicketDesk`]: crate::integration::TicketDesk

pub mod handlers;
pub mod output;

pub use output::OutputFormatter;

use crate::core::{Category, FilterCriteria, Priority, Status, TicketId};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Support ticket desk with AI-assisted triage
#[derive(Parser, Debug)]
#[command(name = "ticketdesk", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ticket service base URL, overriding configuration
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List tickets matching the given filters
    List {
        #[arg(long)]
        category: Option<Category>,

        #[arg(long)]
        priority: Option<Priority>,

        #[arg(long)]
        status: Option<Status>,

        /// Case-insensitive text to look for in title or description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a single ticket
    Show {
        /// Ticket ID (a leading '#' is accepted)
        id: TicketId,
    },

    /// Draft and submit a new ticket
    New {
        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Category to use instead of the suggestion
        #[arg(long)]
        category: Option<Category>,

        /// Priority to use instead of the suggestion
        #[arg(long)]
        priority: Option<Priority>,

        /// Skip automatic classification
        #[arg(long)]
        no_ai: bool,
    },

    /// Change a ticket's status
    Status { id: TicketId, status: Status },

    /// Show aggregate ticket statistics
    Stats {
        /// Keep polling until interrupted
        #[arg(short, long)]
        watch: bool,
    },

    /// Suggest a category and priority for a description
    Classify { description: String },
}

impl Commands {
    /// Filter criteria for `list`, empty for every other command
    #[must_use]
    pub fn filter_criteria(&self) -> FilterCriteria {
        match self {
            Self::List {
                category,
                priority,
                status,
                search,
            } => FilterCriteria {
                category: *category,
                priority: *priority,
                status: *status,
                search: search.clone(),
            },
            _ => FilterCriteria::default(),
        }
    }
}
