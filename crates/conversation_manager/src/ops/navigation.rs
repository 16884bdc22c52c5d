//! Branch navigation.

use chat_core::Message;
use message_store::MessagePatch;
use uuid::Uuid;

use crate::error::{ConversationError, Result};
use crate::manager::ConversationManager;

impl ConversationManager {
    /// Switch which branch of `message_id` is displayed.
    ///
    /// An out-of-range index is a no-op with a logged warning: a stale
    /// selector must never crash the UI. On success only the selector and
    /// displayed content are persisted, a lightweight write compared to full
    /// branch rewrites. The caller re-runs reconciliation to pick up the new
    /// branch's timeline.
    pub async fn select_branch(
        &self,
        log: &mut Vec<Message>,
        message_id: Uuid,
        branch_index: usize,
    ) -> Result<()> {
        let position = log
            .iter()
            .position(|m| m.id == message_id)
            .ok_or(ConversationError::MessageNotFound(message_id))?;

        let branch_count = log[position].branches.len();
        if branch_index >= branch_count {
            tracing::warn!(
                message_id = %message_id,
                branch_index,
                branch_count,
                "ignoring selection of a branch that does not exist"
            );
            return Ok(());
        }

        let content = log[position].branches[branch_index].content.clone();
        log[position].current_branch_index = Some(branch_index);
        log[position].content = content.clone();

        tracing::debug!(message_id = %message_id, branch_index, "branch selected");

        // Spaced out so rapid sibling-hopping does not hammer the API.
        self.save_gate.acquire().await;
        self.store
            .update(message_id, &MessagePatch::selection(content, branch_index))
            .await?;
        Ok(())
    }
}
