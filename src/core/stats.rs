use super::{Category, Priority, Status, Ticket};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category and priority proposed by the classifier for a description
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSuggestion {
    pub category: Category,
    pub priority: Priority,
}

/// Aggregate ticket statistics as served by the stats endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub avg_tickets_per_day: f64,
    #[serde(default)]
    pub priority_breakdown: BTreeMap<Priority, u64>,
    #[serde(default)]
    pub category_breakdown: BTreeMap<Category, u64>,
}

impl StatsSnapshot {
    /// Aggregate a set of tickets the way the ticket service does.
    ///
    /// Breakdowns list every enumeration value, zero-filled. The daily average
    /// spans whole days since the oldest ticket (at least one), rounded to one
    /// decimal place.
    #[must_use]
    pub fn from_tickets(tickets: &[Ticket], now: DateTime<Utc>) -> Self {
        let mut priority_breakdown: BTreeMap<_, _> =
            Priority::ALL.into_iter().map(|p| (p, 0)).collect();
        let mut category_breakdown: BTreeMap<_, _> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();

        for ticket in tickets {
            *priority_breakdown.entry(ticket.priority).or_insert(0) += 1;
            *category_breakdown.entry(ticket.category).or_insert(0) += 1;
        }

        let total_tickets = tickets.len() as u64;
        let avg_tickets_per_day = tickets
            .iter()
            .map(|t| t.created_at)
            .min()
            .map_or(0.0, |oldest| {
                let days = (now - oldest).num_days().max(1);
                #[allow(clippy::cast_precision_loss)]
                let avg = total_tickets as f64 / days as f64;
                (avg * 10.0).round() / 10.0
            });

        Self {
            total_tickets,
            open_tickets: tickets.iter().filter(|t| t.status == Status::Open).count() as u64,
            avg_tickets_per_day,
            priority_breakdown,
            category_breakdown,
        }
    }

    /// Share of tickets still open, in `0.0..=1.0`
    #[must_use]
    pub fn open_ratio(&self) -> f64 {
        if self.total_tickets == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.open_tickets as f64 / self.total_tickets as f64;
        ratio
    }

    #[must_use]
    pub fn priority_count(&self, priority: Priority) -> u64 {
        self.priority_breakdown.get(&priority).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn category_count(&self, category: Category) -> u64 {
        self.category_breakdown.get(&category).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TicketBuilder;
    use chrono::Duration;

    #[test]
    fn test_deserializes_stats_payload() {
        let json = r#"{
            "total_tickets": 12,
            "open_tickets": 5,
            "avg_tickets_per_day": 2.4,
            "priority_breakdown": {"low": 2, "medium": 6, "high": 3, "critical": 1},
            "category_breakdown": {"billing": 4, "technical": 5, "account": 2, "general": 1}
        }"#;
        let stats: StatsSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_tickets, 12);
        assert_eq!(stats.priority_count(Priority::Critical), 1);
        assert_eq!(stats.category_count(Category::Technical), 5);
    }

    #[test]
    fn test_from_tickets_aggregates() {
        let now = Utc::now();
        let tickets = vec![
            TicketBuilder::new()
                .id(1)
                .priority(Priority::High)
                .category(Category::Billing)
                .created_at(now - Duration::days(4))
                .build(),
            TicketBuilder::new()
                .id(2)
                .status(Status::Closed)
                .created_at(now - Duration::days(1))
                .build(),
            TicketBuilder::new().id(3).created_at(now).build(),
        ];

        let stats = StatsSnapshot::from_tickets(&tickets, now);
        assert_eq!(stats.total_tickets, 3);
        assert_eq!(stats.open_tickets, 2);
        assert!((stats.avg_tickets_per_day - 0.8).abs() < f64::EPSILON);
        assert_eq!(stats.priority_count(Priority::High), 1);
        assert_eq!(stats.priority_count(Priority::Medium), 2);
        assert_eq!(stats.priority_count(Priority::Critical), 0);
        assert_eq!(stats.category_breakdown.len(), 4);
    }

    #[test]
    fn test_empty_stats() {
        let stats = StatsSnapshot::from_tickets(&[], Utc::now());
        assert_eq!(stats.total_tickets, 0);
        assert!(stats.avg_tickets_per_day.abs() < f64::EPSILON);
        assert!(stats.open_ratio().abs() < f64::EPSILON);
    }
}
