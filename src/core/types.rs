use crate::error::{Result, TicketDeskError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Billing,
    Technical,
    Account,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Billing, Self::Technical, Self::Account, Self::General];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Billing => "billing",
            Self::Technical => "technical",
            Self::Account => "account",
            Self::General => "general",
        }
    }

    /// Human readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Billing => "Billing",
            Self::Technical => "Technical",
            Self::Account => "Account",
            Self::General => "General",
        }
    }
}

/// Ticket priority, ordered from least to most urgent
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

/// Ticket lifecycle status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }
}

macro_rules! impl_wire_enum {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = TicketDeskError;

            fn from_str(s: &str) -> Result<Self> {
                let needle = s.trim().to_lowercase().replace(['-', ' '], "_");
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| {
                        let expected: Vec<_> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        TicketDeskError::InvalidInput(format!(
                            "Invalid {}: '{}'. Expected one of: {}",
                            $what,
                            s,
                            expected.join(", ")
                        ))
                    })
            }
        }
    };
}

impl_wire_enum!(Category, "category");
impl_wire_enum!(Priority, "priority");
impl_wire_enum!(Status, "status");
