//! Request and response bodies exchanged with the ticket service

use crate::core::{Category, ClassificationSuggestion, Priority, Ticket};
use crate::error::TicketDeskError;
use serde::{Deserialize, Serialize};

/// List response: either a bare array or a paginated envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TicketListResponse {
    Paginated(TicketPage),
    Bare(Vec<Ticket>),
}

/// Paginated envelope; tickets live under `results`
#[derive(Debug, Clone, Deserialize)]
pub struct TicketPage {
    pub results: Vec<Ticket>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl TicketListResponse {
    /// Normalize either shape to the plain ticket sequence
    #[must_use]
    pub fn into_tickets(self) -> Vec<Ticket> {
        match self {
            Self::Paginated(page) => page.results,
            Self::Bare(tickets) => tickets,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest<'a> {
    pub description: &'a str,
}

/// Raw classify response.
///
/// Values are kept as strings so an unexpected label degrades to the default
/// instead of failing the whole response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifyResponse {
    #[serde(default)]
    pub suggested_category: Option<String>,
    #[serde(default)]
    pub suggested_priority: Option<String>,
}

impl ClassifyResponse {
    /// Convert to a suggestion, substituting `general` / `medium` for
    /// missing or unrecognized values
    #[must_use]
    pub fn into_suggestion(self) -> ClassificationSuggestion {
        let category = self
            .suggested_category
            .and_then(|c| c.parse::<Category>().ok())
            .unwrap_or_default();
        let priority = self
            .suggested_priority
            .and_then(|p| p.parse::<Priority>().ok())
            .unwrap_or_default();
        ClassificationSuggestion { category, priority }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Build an API error from a failed response, keeping the server's `detail`
#[must_use]
pub fn api_error(status: u16, body: &str) -> TicketDeskError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .filter(|d| !d.is_empty());
    TicketDeskError::Api { status, detail }
}
