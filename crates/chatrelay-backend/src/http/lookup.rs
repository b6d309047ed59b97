use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::LookupClientConfig;
use crate::error::BackendError;
use crate::traits::ResourceLookup;
use crate::types::{LookupEntry, LookupRequest};

/// Resource-lookup service over HTTP
pub struct HttpResourceLookup {
    http_client: reqwest::Client,
    url: String,
}

impl HttpResourceLookup {
    pub fn new(config: LookupClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            url: config.url,
        })
    }
}

#[async_trait]
impl ResourceLookup for HttpResourceLookup {
    async fn lookup(&self, request: &LookupRequest) -> crate::Result<Vec<LookupEntry>> {
        let response = self
            .http_client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::from_status(status, &body));
        }

        response.json().await.map_err(BackendError::from_transport)
    }
}
