//! The edit orchestrator.

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
    /// Replace the content of a previous user message without losing history.
    ///
    /// The superseded timeline is captured in a branch and persisted *before*
    /// any deletion, then a new branch is created for `new_content` and a
    /// fresh response streamed for it. A crash or partition between the
    /// branch persist and the tail deletion leaves duplicates in the flat
    /// log, which reconciliation suppresses; the reverse order would lose
    /// data permanently.
    pub async fn edit_message(
        &self,
        log: &mut Vec<Message>,
        message_id: Uuid,
        new_content: &str,
        events: &EventSender,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let new_content = new_content.trim();
        if new_content.is_empty() {
            return Err(ConversationError::EmptyContent);
        }

        let position = log
            .iter()
            .position(|m| m.id == message_id)
            .ok_or(ConversationError::MessageNotFound(message_id))?;
        if !log[position].is_user() {
            return Err(ConversationError::NotAUserMessage(message_id));
        }
        if log[position].display_content() == new_content {
            return Err(ConversationError::UnchangedContent);
        }

        let _guard = self.begin_operation(message_id)?;

        // The tail is computed on the reconciled view: what the user actually
        // sees after this message is what the new branch supersedes.
        let displayed = reconcile(log);
        let displayed_position = displayed
            .iter()
            .position(|m| m.id == message_id)
            .ok_or(ConversationError::MessageNotFound(message_id))?;
        let tail: Vec<Message> = displayed[displayed_position + 1..].to_vec();

        tracing::info!(
            message_id = %message_id,
            tail_len = tail.len(),
            existing_branches = log[position].branches.len(),
            "editing user message"
        );

        let mut branches = log[position].branches.clone();
        if branches.is_empty() {
            // Copy-on-first-write: branch 0 preserves the original timeline.
            branches.push(Branch::with_tail(
                log[position].content.clone(),
                log[position].created_at,
                tail.clone(),
            ));
        } else {
            // Stash the displayed timeline into the branch it belongs to, so
            // turns recorded after that branch was filled are not lost.
            let current = log[position].active_branch_index().min(branches.len() - 1);
            branches[current].subsequent_messages = tail.clone();
        }
        branches.push(Branch::new(new_content, Utc::now()));
        let new_index = branches.len() - 1;

        // Persist the branch set before anything is deleted. A failure here
        // aborts the whole edit with local and remote state untouched.
        self.store
            .update(message_id, &MessagePatch::branches(branches.clone(), new_index))
            .await?;

        self.delete_superseded(&tail, events).await;

        log.truncate(position + 1);
        {
            let target = &mut log[position];
            target.branches = branches;
            target.current_branch_index = Some(new_index);
            target.content = new_content.to_string();
        }

        let trigger = log[position].clone();
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
            .stream_into_placeholder(log, placeholder_index, new_content, events, cancel)
            .await?;

        let target = &mut log[position];
        target.branches[new_index].subsequent_messages = vec![assistant];
        let snapshot = target.clone();
        self.save_branches_best_effort(&snapshot, events).await;

        Ok(())
    }
}
