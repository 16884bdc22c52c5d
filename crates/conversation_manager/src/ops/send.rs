//! The ordinary chat turn: append a user message, stream the reply.

use chat_core::Message;
use message_store::NewMessage;
use tokio_util::sync::CancellationToken;

use crate::error::{ConversationError, Result};
use crate::events::{emit, ConversationEvent, EventSender};
use crate::manager::ConversationManager;

impl ConversationManager {
    /// Append a user turn and stream the grounded response for it.
    ///
    /// The user message is durable before streaming starts; a failed or
    /// cancelled stream removes the placeholder but never loses what the
    /// user typed.
    pub async fn send_message(
        &self,
        log: &mut Vec<Message>,
        content: &str,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ConversationError::EmptyContent);
        }

        let user = Message::user(content);
        self.store.create(&NewMessage::from(&user)).await?;
        emit(
            events,
            ConversationEvent::Created {
                message_id: user.id,
                role: user.role,
            },
        );
        log.push(user.clone());

        let placeholder = Message::assistant_after(&user, "");
        emit(
            events,
            ConversationEvent::Created {
                message_id: placeholder.id,
                role: placeholder.role,
            },
        );
        log.push(placeholder);
        let placeholder_index = log.len() - 1;

        let assistant = self
            .stream_into_placeholder(log, placeholder_index, content, events, cancel)
            .await?;

        if let Err(err) = self.store.create(&NewMessage::from(&assistant)).await {
            tracing::warn!(
                message_id = %assistant.id,
                error = %err,
                "assistant message save failed, in-memory state retained"
            );
            emit(
                events,
                ConversationEvent::SaveFailed {
                    message_id: assistant.id,
                    error: err.to_string(),
                },
            );
        }
        Ok(())
    }
}
