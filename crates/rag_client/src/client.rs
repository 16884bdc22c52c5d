//! HTTP streaming client

use std::time::Duration;

use async_trait::async_trait;
use chat_core::Config;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use log::{info, warn};
use serde::Serialize;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

use crate::chunk::StreamEvent;
use crate::error::{Result, StreamError};

/// The streaming seam consumed by the conversation orchestrators.
///
/// Implementations push chunks into `tx` as they arrive and return once the
/// stream ends. A `Done` chunk marks successful completion; a dropped receiver
/// stops the stream silently.
#[async_trait]
pub trait ResponseStreamer: Send + Sync {
    async fn stream_response(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
        tx: Sender<Result<StreamEvent>>,
    ) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    document_id: Option<&'a str>,
}

/// Streams answers from the RAG query service over server-sent events.
pub struct HttpRagClient {
    client: reqwest::Client,
    base_url: String,
    document_id: Option<String>,
}

impl HttpRagClient {
    pub fn new(config: &Config) -> Result<Self> {
        // Only the connection is bounded; an answer stream may legitimately
        // outlive any fixed request timeout.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.rag_api_base.trim_end_matches('/').to_string(),
            document_id: config.document_id.clone(),
        })
    }
}

#[async_trait]
impl ResponseStreamer for HttpRagClient {
    async fn stream_response(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
        tx: Sender<Result<StreamEvent>>,
    ) -> Result<()> {
        let request = QueryRequest {
            prompt,
            document_id: self.document_id.as_deref(),
        };

        info!("streaming query ({} chars)", prompt.len());
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(StreamError::Cancelled),
            sent = self
                .client
                .post(format!("{}/query", self.base_url))
                .json(&request)
                .send() => sent?,
        };

        let status = response.status();
        if !status.is_success() {
            warn!("query service rejected request with status {status}");
            return Err(StreamError::Status {
                status: status.as_u16(),
            });
        }

        let mut event_stream = response.bytes_stream().eventsource();
        loop {
            let event_result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("query stream cancelled by caller");
                    return Err(StreamError::Cancelled);
                }
                next = event_stream.next() => match next {
                    Some(result) => result,
                    None => break,
                },
            };

            match event_result {
                Ok(message) => match serde_json::from_str::<StreamEvent>(&message.data) {
                    Ok(chunk) => {
                        let done = matches!(chunk, StreamEvent::Done { .. });
                        if tx.send(Ok(chunk)).await.is_err() {
                            warn!("receiver dropped, abandoning query stream");
                            return Ok(());
                        }
                        if done {
                            return Ok(());
                        }
                    }
                    Err(err) => {
                        warn!("skipping malformed stream chunk: {err}, data: {}", message.data);
                    }
                },
                Err(err) => {
                    let error = StreamError::Protocol(err.to_string());
                    let _ = tx.send(Err(error.clone())).await;
                    return Err(error);
                }
            }
        }

        let _ = tx.send(Err(StreamError::Incomplete)).await;
        Err(StreamError::Incomplete)
    }
}
