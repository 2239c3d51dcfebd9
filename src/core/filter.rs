use super::{Category, Priority, Status, Ticket};
use serde::{Deserialize, Serialize};

/// Optional constraints for listing tickets; `None` means unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub search: Option<String>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Search text, with blank input treated as absent
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Query parameters for a list request, omitting unconstrained fields
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = self.search_term() {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }

    /// Whether a ticket satisfies these criteria, using the ticket service's
    /// semantics: exact enum matches and case-insensitive substring search
    /// over title or description.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if self.category.is_some_and(|c| c != ticket.category) {
            return false;
        }
        if self.priority.is_some_and(|p| p != ticket.priority) {
            return false;
        }
        if self.status.is_some_and(|s| s != ticket.status) {
            return false;
        }
        if let Some(term) = self.search_term() {
            let term = term.to_lowercase();
            return ticket.title.to_lowercase().contains(&term)
                || ticket.description.to_lowercase().contains(&term);
        }
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TicketBuilder;

    #[test]
    fn test_query_pairs_skip_absent_and_blank() {
        let criteria = FilterCriteria::new()
            .with_status(Status::InProgress)
            .with_search("   ");
        assert_eq!(
            criteria.query_pairs(),
            vec![("status", "in_progress".to_string())]
        );
        assert!(FilterCriteria::new().with_search("").is_empty());
    }

    #[test]
    fn test_matches_combines_constraints() {
        let ticket = TicketBuilder::new()
            .title("Refund request")
            .description("I was double charged")
            .category(Category::Billing)
            .priority(Priority::High)
            .build();

        assert!(FilterCriteria::new().matches(&ticket));
        assert!(
            FilterCriteria::new()
                .with_category(Category::Billing)
                .with_search("DOUBLE")
                .matches(&ticket)
        );
        assert!(
            !FilterCriteria::new()
                .with_category(Category::Billing)
                .with_priority(Priority::Low)
                .matches(&ticket)
        );
        assert!(!FilterCriteria::new().with_search("password").matches(&ticket));
    }
}
