//! Storage trait and wire DTOs

use async_trait::async_trait;
use chat_core::{Branch, Message, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of a `POST /messages` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for NewMessage {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            role: message.role,
            content: message.content.clone(),
            created_at: message.created_at,
        }
    }
}

/// Body of a `PATCH /messages/{id}` request. Absent fields are left untouched
/// by the server, so a patch carries only what an operation actually changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<Branch>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_branch_index: Option<usize>,
}

impl MessagePatch {
    /// A full branch-set rewrite, used by the edit/regenerate orchestrators.
    pub fn branches(branches: Vec<Branch>, current_branch_index: usize) -> Self {
        Self {
            content: None,
            branches: Some(branches),
            current_branch_index: Some(current_branch_index),
        }
    }

    /// The lightweight write issued by branch navigation: only the selector
    /// and the displayed content change.
    pub fn selection<S: Into<String>>(content: S, current_branch_index: usize) -> Self {
        Self {
            content: Some(content.into()),
            branches: None,
            current_branch_index: Some(current_branch_index),
        }
    }
}

/// The persistence seam consumed by the conversation orchestrators.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message.
    async fn create(&self, message: &NewMessage) -> crate::Result<()>;

    /// Apply a partial update to an existing message. Retrying the same patch
    /// must yield the same stored state.
    async fn update(&self, id: Uuid, patch: &MessagePatch) -> crate::Result<()>;

    /// Delete a message by id.
    async fn delete(&self, id: Uuid) -> crate::Result<()>;
}
