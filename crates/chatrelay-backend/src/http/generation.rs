use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::config::GenerationClientConfig;
use crate::error::{status_means_unavailable, BackendError};
use crate::traits::GenerationBackend;
use crate::types::{GenerationReply, GenerationRequest};

/// Generation backend over plain HTTP + JSON
pub struct HttpGenerationClient {
    http_client: reqwest::Client,
    config: GenerationClientConfig,
}

impl HttpGenerationClient {
    pub fn new(config: GenerationClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { http_client, config })
    }

    pub fn config(&self) -> &GenerationClientConfig {
        &self.config
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> crate::Result<GenerationReply> {
        let response = self
            .http_client
            .post(&self.config.generation_url)
            .json(request)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());

            tracing::warn!(
                status = %status,
                session_id = %request.session_id,
                "Generation backend returned an error status"
            );
            return Err(BackendError::from_status(status, &body));
        }

        let reply: GenerationReply = response.json().await.map_err(BackendError::from_transport)?;
        tracing::debug!(
            session_id = %request.session_id,
            has_title = reply.title.is_some(),
            references = reply.reference_names().len(),
            "Generation backend replied"
        );
        Ok(reply)
    }

    async fn check_health(&self) -> crate::Result<()> {
        let response = self
            .http_client
            .get(self.config.health_url())
            .timeout(self.config.health_timeout)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        // Probing the generation URL itself may legitimately 404/405 on GET
        let status = response.status();
        let unavailable = match status {
            StatusCode::NOT_FOUND => self.config.health_url.is_some(),
            other => status_means_unavailable(other),
        };

        if unavailable {
            return Err(BackendError::Unavailable(format!("Health check returned {}", status)));
        }
        Ok(())
    }
}
