//! Shared streaming and save helpers used by the orchestrators.

use std::sync::Arc;

use chat_core::Message;
use message_store::MessagePatch;
use rag_client::StreamEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{ConversationError, Result};
use crate::events::{emit, ConversationEvent, EventSender};
use crate::manager::ConversationManager;

const CHUNK_CHANNEL_CAPACITY: usize = 32;

impl ConversationManager {
    /// Stream a response for `prompt` into the placeholder at
    /// `placeholder_index`, mirroring partials into the local log and
    /// emitting UI events between chunks.
    ///
    /// On success the placeholder becomes the final assistant message and a
    /// clone of it is returned. On failure or cancellation the placeholder is
    /// removed from the log and the error propagated.
    pub(crate) async fn stream_into_placeholder(
        &self,
        log: &mut Vec<Message>,
        placeholder_index: usize,
        prompt: &str,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<Message> {
        let placeholder_id = log[placeholder_index].id;
        let (tx, mut rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);

        let streamer = Arc::clone(&self.streamer);
        let cancel_token = cancel.child_token();
        let query = prompt.to_string();
        let worker =
            tokio::spawn(async move { streamer.stream_response(&query, &cancel_token, tx).await });

        let mut outcome: Result<String> = Err(ConversationError::Streaming(
            "stream ended before completing".to_string(),
        ));
        while let Some(chunk) = rx.recv().await {
            match chunk {
                Ok(StreamEvent::Delta { partial }) => {
                    log[placeholder_index].content = partial.clone();
                    emit(
                        events,
                        ConversationEvent::ContentDelta {
                            message_id: placeholder_id,
                            partial,
                        },
                    );
                }
                Ok(StreamEvent::Sources { sources }) => {
                    emit(
                        events,
                        ConversationEvent::SourcesResolved {
                            message_id: placeholder_id,
                            sources,
                        },
                    );
                }
                Ok(StreamEvent::Done { response }) => {
                    outcome = Ok(response);
                }
                Err(err) => {
                    outcome = Err(err.into());
                    break;
                }
            }
        }

        // When the channel closed without a terminal chunk (cancellation
        // sends nothing), the worker's own result is authoritative.
        let worker_result = worker.await;
        if outcome.is_err() {
            match worker_result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => outcome = Err(err.into()),
                Err(join_err) => outcome = Err(ConversationError::Streaming(join_err.to_string())),
            }
        }

        match outcome {
            Ok(response) => {
                let message = &mut log[placeholder_index];
                message.content = response;
                let finished = message.clone();
                tracing::info!(
                    message_id = %placeholder_id,
                    chars = finished.content.len(),
                    "response streaming completed"
                );
                emit(
                    events,
                    ConversationEvent::Completed {
                        message_id: placeholder_id,
                        message: finished.clone(),
                    },
                );
                Ok(finished)
            }
            Err(err) => {
                log.remove(placeholder_index);
                tracing::warn!(
                    message_id = %placeholder_id,
                    error = %err,
                    "response streaming failed, placeholder removed"
                );
                emit(
                    events,
                    ConversationEvent::StreamingFailed {
                        message_id: placeholder_id,
                        error: err.to_string(),
                    },
                );
                Err(err)
            }
        }
    }

    /// Best-effort deletion of superseded messages. Failures are logged and
    /// reported as warnings only: the data already lives inside a persisted
    /// branch, and reconciliation suppresses any duplicate left behind.
    pub(crate) async fn delete_superseded(&self, tail: &[Message], events: &EventSender) {
        for message in tail {
            if let Err(err) = self.store.delete(message.id).await {
                tracing::warn!(
                    message_id = %message.id,
                    error = %err,
                    "failed to delete superseded message, duplicate will be suppressed on display"
                );
                emit(
                    events,
                    ConversationEvent::CleanupSkipped {
                        message_id: message.id,
                        error: err.to_string(),
                    },
                );
            }
        }
    }

    /// Best-effort persist of a message's final branch set after streaming.
    /// The content is already visible locally, so a failure is reported as a
    /// warning rather than an error.
    pub(crate) async fn save_branches_best_effort(&self, message: &Message, events: &EventSender) {
        let patch =
            MessagePatch::branches(message.branches.clone(), message.active_branch_index());
        if let Err(err) = self.store.update(message.id, &patch).await {
            tracing::warn!(
                message_id = %message.id,
                error = %err,
                "final branch save failed, in-memory state retained"
            );
            emit(
                events,
                ConversationEvent::SaveFailed {
                    message_id: message.id,
                    error: err.to_string(),
                },
            );
        }
    }
}
