use chat_core::{Message, Role};
use rag_client::SourceRef;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Granular updates emitted while an operation runs, which a frontend
/// consumes to keep an accurate replica of the in-flight conversation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// A new message was appended to the local log.
    Created { message_id: Uuid, role: Role },

    /// The partial response streamed so far for a placeholder message.
    ContentDelta { message_id: Uuid, partial: String },

    /// Retrieval metadata for the response being streamed.
    SourcesResolved {
        message_id: Uuid,
        sources: Vec<SourceRef>,
    },

    /// A streamed message is finalised with its full payload.
    Completed { message_id: Uuid, message: Message },

    /// Streaming failed or was cancelled; the placeholder was removed.
    StreamingFailed { message_id: Uuid, error: String },

    /// A superseded message could not be deleted. Harmless: reconciliation
    /// suppresses the duplicate until a later cleanup succeeds.
    CleanupSkipped { message_id: Uuid, error: String },

    /// A post-completion save failed; the in-memory state is retained.
    SaveFailed { message_id: Uuid, error: String },
}

/// Channel end the orchestrators emit events into. The receiver may be
/// dropped at any time without affecting an operation's outcome.
pub type EventSender = UnboundedSender<ConversationEvent>;

pub(crate) fn emit(events: &EventSender, event: ConversationEvent) {
    if events.send(event).is_err() {
        tracing::debug!("event receiver dropped, update not delivered");
    }
}
