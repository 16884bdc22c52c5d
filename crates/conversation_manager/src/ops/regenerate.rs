//! The regenerate orchestrator.

use chat_core::{Branch, Message};
use chrono::Utc;
use message_store::MessagePatch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ConversationError, Result};
use crate::events::{emit, ConversationEvent, EventSender};
use crate::manager::ConversationManager;
use crate::reconcile::reconcile;

impl ConversationManager {
    /// Produce a fresh response for an assistant message without discarding
    /// the one being replaced.
    ///
    /// Regeneration always creates a new sibling branch on the root user
    /// message rather than overwriting: every prior response stays reachable
    /// through branch navigation, and the newest branch is the one displayed.
    /// The prompt is never changed; the sibling repeats the root's active
    /// content with an empty timeline.
    pub async fn regenerate(
        &self,
        log: &mut Vec<Message>,
        assistant_message_id: Uuid,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<()> {
        // The target may live inside a branch tail rather than the raw log,
        // so it is located on the reconciled view.
        let displayed = reconcile(log);
        let target_position = displayed
            .iter()
            .position(|m| m.id == assistant_message_id)
            .ok_or(ConversationError::MessageNotFound(assistant_message_id))?;
        if !displayed[target_position].is_assistant() {
            return Err(ConversationError::NotAnAssistantMessage(assistant_message_id));
        }
        let root_position = displayed[..target_position]
            .iter()
            .rposition(|m| m.is_user())
            .ok_or(ConversationError::NoPrecedingUserMessage(assistant_message_id))?;
        let root_id = displayed[root_position].id;

        let _guard = self.begin_operation(root_id)?;

        let raw_position = log
            .iter()
            .position(|m| m.id == root_id)
            .ok_or(ConversationError::MessageNotFound(root_id))?;

        // Everything displayed after the root user message is superseded,
        // including the target itself.
        let tail: Vec<Message> = displayed[root_position + 1..].to_vec();

        let root = &log[raw_position];
        let prompt = root.display_content().to_string();

        tracing::info!(
            assistant_message_id = %assistant_message_id,
            root_id = %root_id,
            tail_len = tail.len(),
            existing_branches = root.branches.len(),
            "regenerating assistant response"
        );

        let mut branches = root.branches.clone();
        if branches.is_empty() {
            // First regeneration: branch 0 preserves the original prompt and
            // the response being replaced.
            branches.push(Branch::with_tail(
                root.content.clone(),
                root.created_at,
                tail.clone(),
            ));
        } else {
            // Preserve whichever version is being regenerated, including a
            // previously regenerated one.
            let current = root.active_branch_index().min(branches.len() - 1);
            branches[current].subsequent_messages = tail.clone();
        }
        branches.push(Branch::new(prompt.clone(), Utc::now()));
        let new_index = branches.len() - 1;

        // Same ordering rationale as edit: the old response must be durable
        // inside its branch before its flat-log copy is deleted.
        self.store
            .update(root_id, &MessagePatch::branches(branches.clone(), new_index))
            .await?;

        self.delete_superseded(&tail, events).await;

        log.truncate(raw_position + 1);
        {
            let target = &mut log[raw_position];
            target.branches = branches;
            target.current_branch_index = Some(new_index);
            target.content = prompt.clone();
        }

        let trigger = log[raw_position].clone();
        let placeholder = Message::assistant_after(&trigger, "");
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
            .stream_into_placeholder(log, placeholder_index, &prompt, events, cancel)
            .await?;

        let target = &mut log[raw_position];
        target.branches[new_index].subsequent_messages = vec![assistant];
        let snapshot = target.clone();
        self.save_branches_best_effort(&snapshot, events).await;

        Ok(())
    }
}
