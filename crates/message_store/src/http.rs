//! HTTP implementation of the message store

use std::time::Duration;

use async_trait::async_trait;
use chat_core::Config;
use log::{debug, warn};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::{MessagePatch, MessageStore, NewMessage};

/// Message persistence over the external JSON API.
///
/// Transient failures are retried with exponential backoff. The PATCH bodies
/// produced by the orchestrators are idempotent, so a retried write lands on
/// the same stored state.
pub struct HttpMessageStore {
    client: ClientWithMiddleware,
    base_url: String,
}

impl HttpMessageStore {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        let client = Self::build_retry_client(client, config.max_retries);

        Ok(Self {
            client,
            base_url: config.message_api_base.trim_end_matches('/').to_string(),
        })
    }

    fn build_retry_client(client: Client, max_retries: u32) -> ClientWithMiddleware {
        // Exponential backoff: 1s, 2s, 4s with jitter
        let retry_policy = ExponentialBackoff::builder()
            .build_with_max_retries(max_retries);

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }

    fn message_url(&self, id: Uuid) -> String {
        format!("{}/messages/{}", self.base_url, id)
    }

    fn check_status(response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Status {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl MessageStore for HttpMessageStore {
    async fn create(&self, message: &NewMessage) -> Result<()> {
        debug!("POST message {} ({:?})", message.id, message.role);
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .json(message)
            .send()
            .await?;
        Self::check_status(&response)
    }

    async fn update(&self, id: Uuid, patch: &MessagePatch) -> Result<()> {
        debug!(
            "PATCH message {} (branches: {}, selector: {:?})",
            id,
            patch.branches.as_ref().map(Vec::len).unwrap_or(0),
            patch.current_branch_index,
        );
        let response = self
            .client
            .patch(self.message_url(id))
            .json(patch)
            .send()
            .await?;
        Self::check_status(&response)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        debug!("DELETE message {id}");
        let response = self.client.delete(self.message_url(id)).send().await?;
        if let Err(err) = Self::check_status(&response) {
            warn!("delete of message {id} rejected: {err}");
            return Err(err);
        }
        Ok(())
    }
}
