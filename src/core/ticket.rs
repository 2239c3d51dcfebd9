use super::{Category, Priority, Status};
use crate::error::{Result, TicketDeskError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned ticket identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TicketId {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .trim_start_matches('#')
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TicketDeskError::InvalidInput(format!("Invalid ticket ID: '{s}'")))
    }
}

impl From<u64> for TicketId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A ticket as stored by the ticket service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
}

/// Partial update body; only `status` is mutable from the desk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TicketPatch {
    #[must_use]
    pub const fn status(status: Status) -> Self {
        Self {
            status: Some(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_deserializes_service_payload() {
        let json = r#"{
            "id": 7,
            "title": "Cannot log in",
            "description": "Password reset link is broken",
            "category": "account",
            "priority": "high",
            "status": "in_progress",
            "created_at": "2024-03-01T10:15:00Z",
            "updated_at": "2024-03-02T08:00:00Z"
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, TicketId::new(7));
        assert_eq!(ticket.category, Category::Account);
        assert_eq!(ticket.status, Status::InProgress);
        assert!(ticket.updated_at.is_some());
    }

    #[test]
    fn test_ticket_without_updated_at() {
        let json = r#"{"id": 1, "title": "t", "description": "d", "category": "general",
            "priority": "low", "status": "open", "created_at": "2024-03-01T10:15:00Z"}"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert!(ticket.updated_at.is_none());
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = TicketPatch::status(Status::Closed);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({"status": "closed"})
        );
        assert_eq!(
            serde_json::to_value(TicketPatch::default()).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn test_ticket_id_parsing() {
        assert_eq!("42".parse::<TicketId>().unwrap(), TicketId::new(42));
        assert_eq!("#42".parse::<TicketId>().unwrap(), TicketId::new(42));
        assert!("abc".parse::<TicketId>().is_err());
    }
}
