use chat_core::Message;
use uuid::Uuid;

/// Derive the displayed conversation from a raw log annotated with branches.
///
/// Pure and idempotent. For every user message with branches, the active
/// branch's content is substituted and its `subsequent_messages` are spliced
/// in; any contiguous run of following raw entries whose ids are captured
/// inside one of the message's branches is then skipped. Such entries are the
/// transient residue of an edit or regeneration whose best-effort cleanup did
/// not finish, so the displayed log stays correct even after a crash between
/// the branch persist and the tail deletion. The scan is bounded: the first
/// id no branch has captured ends it.
///
/// An out-of-range branch selector never fails the transform; the message is
/// emitted unchanged and an anomaly is logged.
pub fn reconcile(log: &[Message]) -> Vec<Message> {
    let mut displayed = Vec::with_capacity(log.len());
    let mut position = 0;

    while position < log.len() {
        let message = &log[position];
        position += 1;

        if !(message.is_user() && !message.branches.is_empty()) {
            displayed.push(message.clone());
            continue;
        }

        let index = message.active_branch_index();
        let Some(branch) = message.branches.get(index) else {
            tracing::warn!(
                message_id = %message.id,
                branch_index = index,
                branch_count = message.branches.len(),
                "branch selector out of range, emitting message unchanged"
            );
            displayed.push(message.clone());
            continue;
        };

        let mut resolved = message.clone();
        resolved.content = branch.content.clone();
        displayed.push(resolved);
        displayed.extend(branch.subsequent_messages.iter().cloned());

        // Every message captured by a branch is superseded as a flat entry;
        // matching the active branch alone would leak tails stashed in the
        // siblings whenever their deletion did not finish.
        let captured: Vec<Uuid> = message
            .branches
            .iter()
            .flat_map(|branch| branch.subsequent_messages.iter().map(|m| m.id))
            .collect();

        while position < log.len() && captured.contains(&log[position].id) {
            tracing::debug!(
                message_id = %log[position].id,
                "skipping stale duplicate of a branch-owned message"
            );
            position += 1;
        }
    }

    displayed
}
