//! HTTP client for the opsdesk daemon API.

use anyhow::{bail, Context, Result};
use opsdesk_shared::api::{
    AgentsResponse, CreateTicketRequest, HealthResponse, QueryResponse, TextRequest,
    TicketListResponse, TicketMessageResponse, TicketResponse, UpdateStatusRequest, VisionRequest,
};
use opsdesk_shared::ticket::{Importance, TicketStatus};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub struct DaemonClient {
    http: reqwest::Client,
    base: String,
}

impl DaemonClient {
    pub fn new(base: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(180))
                .build()
                .unwrap_or_default(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Decode a successful body, or surface the daemon's error envelope
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.context("Malformed daemon response");
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<TicketMessageResponse>(&body) {
            Ok(envelope) => bail!("{}", envelope.message),
            Err(_) => bail!("Daemon returned {}: {}", status, body),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .context("Failed to reach daemon. Is opsdeskd running?")?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .context("Failed to reach daemon. Is opsdeskd running?")?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json("/v1/health").await
    }

    pub async fn agents(&self) -> Result<AgentsResponse> {
        self.get_json("/v1/agents").await
    }

    pub async fn ask(&self, prompt: String) -> Result<QueryResponse> {
        self.post_json("/v1/text", &TextRequest { prompt }).await
    }

    pub async fn vision(&self, prompt: Option<String>, image_base64: String) -> Result<QueryResponse> {
        self.post_json(
            "/v1/vision",
            &VisionRequest {
                prompt,
                image_base64,
            },
        )
        .await
    }

    pub async fn create_ticket(
        &self,
        issue: String,
        importance: Importance,
    ) -> Result<TicketMessageResponse> {
        self.post_json("/v1/tickets", &CreateTicketRequest { issue, importance })
            .await
    }

    pub async fn list_tickets(&self, limit: usize, offset: usize) -> Result<TicketListResponse> {
        self.get_json(&format!("/v1/tickets?limit={}&offset={}", limit, offset))
            .await
    }

    pub async fn get_ticket(&self, ticket_id: &str) -> Result<TicketResponse> {
        self.get_json(&format!("/v1/tickets/{}", ticket_id)).await
    }

    pub async fn delete_ticket(&self, ticket_id: &str) -> Result<TicketMessageResponse> {
        let response = self
            .http
            .delete(self.url(&format!("/v1/tickets/{}", ticket_id)))
            .send()
            .await
            .context("Failed to reach daemon. Is opsdeskd running?")?;
        Self::decode(response).await
    }

    pub async fn search_tickets(&self, query: &str) -> Result<TicketListResponse> {
        let response = self
            .http
            .get(self.url("/v1/tickets/search"))
            .query(&[("q", query)])
            .send()
            .await
            .context("Failed to reach daemon. Is opsdeskd running?")?;
        Self::decode(response).await
    }

    pub async fn update_status(
        &self,
        ticket_id: &str,
        status: TicketStatus,
    ) -> Result<TicketResponse> {
        self.post_json(
            &format!("/v1/tickets/{}/status", ticket_id),
            &UpdateStatusRequest { status },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = DaemonClient::new("http://127.0.0.1:7810/".to_string());
        assert_eq!(client.url("/v1/health"), "http://127.0.0.1:7810/v1/health");
    }
}
