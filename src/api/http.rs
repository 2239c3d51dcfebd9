use super::wire::{self, ClassifyRequest, ClassifyResponse, TicketListResponse};
use super::{Classifier, TicketStore};
use crate::config::ApiConfig;
use crate::core::{
    ClassificationSuggestion, FilterCriteria, NewTicket, StatsSnapshot, Ticket, TicketId,
    TicketPatch,
};
use crate::error::{Result, TicketDeskError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

/// REST client for the ticket service
#[derive(Debug, Clone)]
pub struct HttpTicketStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTicketStore {
    /// Build a client from connection settings
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TicketDeskError::custom(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), "ticket service request failed");
            return Err(wire::api_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TicketStore for HttpTicketStore {
    async fn list_tickets(&self, filters: &FilterCriteria) -> Result<Vec<Ticket>> {
        let request = self
            .http
            .get(self.url("tickets/"))
            .query(&filters.query_pairs());
        let response: TicketListResponse = self.send(request).await?;
        Ok(response.into_tickets())
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Ticket> {
        let request = self.http.get(self.url(&format!("tickets/{id}/")));
        match self.send(request).await {
            Err(TicketDeskError::Api { status: 404, .. }) => Err(TicketDeskError::TicketNotFound { id }),
            other => other,
        }
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        self.send(self.http.post(self.url("tickets/")).json(ticket))
            .await
    }

    async fn update_ticket(&self, id: TicketId, patch: &TicketPatch) -> Result<Ticket> {
        let request = self
            .http
            .patch(self.url(&format!("tickets/{id}/")))
            .json(patch);
        match self.send(request).await {
            Err(TicketDeskError::Api { status: 404, .. }) => Err(TicketDeskError::TicketNotFound { id }),
            other => other,
        }
    }

    async fn get_stats(&self) -> Result<StatsSnapshot> {
        self.send(self.http.get(self.url("tickets/stats/"))).await
    }
}

#[async_trait]
impl Classifier for HttpTicketStore {
    async fn classify(&self, description: &str) -> Result<ClassificationSuggestion> {
        let request = self
            .http
            .post(self.url("tickets/classify/"))
            .json(&ClassifyRequest { description });
        let response: ClassifyResponse = self.send(request).await?;
        Ok(response.into_suggestion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining_tolerates_slashes() {
        let store = HttpTicketStore::new(&ApiConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(store.base_url(), "http://localhost:8000/api");
        assert_eq!(
            store.url("/tickets/stats/"),
            "http://localhost:8000/api/tickets/stats/"
        );
    }
}
