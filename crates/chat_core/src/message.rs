use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message. Serialized in upper case to match the message API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Assistant,
}

/// An entry in the linear conversation log.
///
/// A `Message` with a non-empty `branches` list is a branching point: the
/// entry's displayed content and the messages that follow it depend on which
/// branch is currently selected. Only user messages ever carry branches;
/// assistant replies are generated per branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,

    /// Alternate versions of this message. `branches[0]` is always the
    /// original timeline, seeded lazily on the first edit or regeneration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<Branch>,

    /// Which branch is active. Absent means no branching has occurred yet,
    /// or equivalently that branch 0 (the original) is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_branch_index: Option<usize>,
}

/// One alternate version of a user message, together with everything that
/// followed it in that timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub content: String,
    pub created_at: DateTime<Utc>,

    /// The messages that occurred after this version of the user message,
    /// in this timeline only. Starts empty and is filled once the replacement
    /// response finishes streaming.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsequent_messages: Vec<Message>,
}

impl Message {
    /// Create a new user message stamped with the current time.
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
            branches: Vec::new(),
            current_branch_index: None,
        }
    }

    /// Create an assistant message ordered immediately after `trigger`.
    ///
    /// The timestamp is anchored to the triggering user message rather than
    /// wall-clock completion time, so the pair sorts correctly even when the
    /// two rows are inserted asynchronously.
    pub fn assistant_after<S: Into<String>>(trigger: &Message, content: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
            created_at: trigger.created_at + Duration::milliseconds(1),
            branches: Vec::new(),
            current_branch_index: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    /// The active branch index. An absent selector means branch 0.
    pub fn active_branch_index(&self) -> usize {
        self.current_branch_index.unwrap_or(0)
    }

    /// The active branch, if this message has branches and the selector is in
    /// range.
    pub fn active_branch(&self) -> Option<&Branch> {
        if self.branches.is_empty() {
            return None;
        }
        self.branches.get(self.active_branch_index())
    }

    /// The content currently shown for this message: the active branch's
    /// version when branching has occurred, the flat content otherwise.
    pub fn display_content(&self) -> &str {
        match self.active_branch() {
            Some(branch) => &branch.content,
            None => &self.content,
        }
    }
}

impl Branch {
    pub fn new<S: Into<String>>(content: S, created_at: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            created_at,
            subsequent_messages: Vec::new(),
        }
    }

    pub fn with_tail<S: Into<String>>(
        content: S,
        created_at: DateTime<Utc>,
        subsequent_messages: Vec<Message>,
    ) -> Self {
        Self {
            content: content.into(),
            created_at,
            subsequent_messages,
        }
    }
}
