use crate::api::HttpTicketStore;
use crate::cli::output::{priority_label, status_label};
use crate::config::Config;
use crate::core::Ticket;
use crate::error::Result;
use crate::integration::TicketDesk;
use std::path::Path;
use std::sync::Arc;

/// Common context for all handler operations
pub struct HandlerContext {
    pub config: Config,
    pub store: Arc<HttpTicketStore>,
}

impl HandlerContext {
    /// Load configuration and build the HTTP client
    pub fn new(config_path: Option<&Path>, api_url: Option<&str>) -> Result<Self> {
        let mut config = Config::load(config_path)?;
        if let Some(url) = api_url {
            config.api.base_url = url.to_string();
        }
        let store = Arc::new(HttpTicketStore::new(&config.api)?);
        tracing::debug!(base_url = store.base_url(), "Using ticket service");
        Ok(Self { config, store })
    }

    /// Wire a desk backed by the HTTP store
    pub fn desk(&self) -> TicketDesk {
        TicketDesk::new(&self.config, self.store.clone(), self.store.clone())
    }
}

/// One-line summary used by list output
pub fn ticket_line(ticket: &Ticket) -> String {
    format!(
        "#{:<5} {:<12} {:<9} {:<10} {}",
        ticket.id,
        status_label(ticket.status),
        priority_label(ticket.priority),
        ticket.category.label(),
        ticket.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Priority, Status, TicketBuilder};

    #[test]
    fn test_ticket_line_contains_id_and_title() {
        colored::control::set_override(false);
        let ticket = TicketBuilder::new()
            .id(42)
            .title("VPN drops hourly")
            .priority(Priority::High)
            .status(Status::InProgress)
            .build();
        let line = ticket_line(&ticket);
        assert!(line.starts_with("#42"));
        assert!(line.contains("In Progress"));
        assert!(line.ends_with("VPN drops hourly"));
    }

    #[test]
    fn test_api_url_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://example.invalid/api\"\n").unwrap();

        let ctx = HandlerContext::new(Some(&path), Some("http://127.0.0.1:9/api/")).unwrap();
        assert_eq!(ctx.store.base_url(), "http://127.0.0.1:9/api");
        assert_eq!(ctx.config.api.base_url, "http://127.0.0.1:9/api/");
    }
}
