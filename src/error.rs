//! Error types for ticketdesk
//!
//! Every failure the desk can produce is recoverable: enrichment failures are
//! logged and swallowed, mutation failures roll back or preserve local state,
//! and read failures keep the last good data on screen.

use crate::core::TicketId;
use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, TicketDeskError>;

/// Main error type for ticketdesk
#[derive(Error, Debug)]
pub enum TicketDeskError {
    /// The ticket service answered with a non-success status
    #[error("Ticket service returned HTTP {status}{}", .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Api { status: u16, detail: Option<String> },

    /// The ticket service could not be reached or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// A response body could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Ticket not found: {id}")]
    TicketNotFound { id: TicketId },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A submit was requested while another one is still awaiting the store
    #[error("A ticket submission is already in progress")]
    SubmitInProgress,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Custom(String),
}

impl From<reqwest::Error> for TicketDeskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Custom(format!("Malformed response from ticket service: {err}"));
        }
        Self::Network(err.to_string())
    }
}

impl TicketDeskError {
    /// Create a custom error with the given message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// The `detail` text the server attached to a failed request, if any
    #[must_use]
    pub fn server_detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Message suitable for showing to an operator
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Api { status, .. } => format!("Request failed with HTTP status {status}"),
            Self::Network(_) => "Could not reach the ticket service".to_string(),
            Self::MissingRequiredField { field } => format!("The {field} field is required"),
            _ => self.to_string(),
        }
    }

    /// Hints for fixing the error, shown below the main message
    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Network(_) => vec![
                "Check that the ticket service is running".to_string(),
                "Set TICKETDESK_API__BASE_URL or pass --api-url to point at it".to_string(),
            ],
            Self::Config(_) => vec![
                "Check the syntax of your configuration file".to_string(),
                "Remove unknown keys or fix value types".to_string(),
            ],
            Self::MissingRequiredField { .. } => {
                vec!["Provide both --title and --description".to_string()]
            },
            Self::SubmitInProgress => vec!["Wait for the current submission to finish".to_string()],
            Self::TicketNotFound { .. } => {
                vec!["Run 'ticketdesk list' to see available ticket IDs".to_string()]
            },
            _ => vec![],
        }
    }

    /// Whether retrying later can succeed without operator changes
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !self.is_config_error()
    }

    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
