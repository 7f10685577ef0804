use reqwest::header::ACCEPT;
use reqwest::Client;

use crate::config::Credentials;
use crate::error::ApiError;
use crate::http_client::create_api_client;
use crate::sites::model::{extract_sites, Site};

/// Fetches the protected site list for one account.
pub struct SiteLister<'a> {
    client: Client,
    credentials: &'a Credentials,
}

impl<'a> SiteLister<'a> {
    pub fn new(credentials: &'a Credentials) -> Result<Self, ApiError> {
        Ok(Self::with_client(credentials, create_api_client()?))
    }

    pub fn with_client(credentials: &'a Credentials, client: Client) -> Self {
        Self { client, credentials }
    }

    /// Sends the single listing request and parses the site collection.
    pub async fn list_sites(&self) -> Result<Vec<Site>, ApiError> {
        let creds = self.credentials;
        tracing::info!(endpoint=%creds.endpoint, account_id=%creds.account_id, "listing protected sites");

        let response = self
            .client
            .post(creds.endpoint.clone())
            .query(&[("account_id", creds.account_id.as_str())])
            .header(ACCEPT, "application/json")
            .header("x-API-Id", creds.api_id.as_str())
            .header("x-API-Key", creds.api_key.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "site listing rejected");
            return Err(ApiError::Status { status: status.as_u16(), body });
        }

        let bytes = response.bytes().await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        let sites = extract_sites(body)?;
        tracing::info!(count = sites.len(), "site list received");
        Ok(sites)
    }
}
