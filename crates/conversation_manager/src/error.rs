use message_store::StoreError;
use rag_client::StreamError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the conversation orchestrators.
///
/// Validation variants abort before any mutation. `Persistence` is only
/// returned for writes that precede a destructive step; later persistence
/// failures are downgraded to logged warnings because the data is already
/// safe inside a persisted branch.
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("message content cannot be empty")]
    EmptyContent,

    #[error("edited content matches the current content")]
    UnchangedContent,

    #[error("message {0} not found in the conversation")]
    MessageNotFound(Uuid),

    #[error("message {0} is not a user message")]
    NotAUserMessage(Uuid),

    #[error("message {0} is not an assistant message")]
    NotAnAssistantMessage(Uuid),

    #[error("no user message precedes assistant message {0}")]
    NoPrecedingUserMessage(Uuid),

    #[error("an edit or regeneration is already in flight for message {0}")]
    OperationInFlight(Uuid),

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("streaming error: {0}")]
    Streaming(String),

    #[error("response streaming was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ConversationError>;

impl From<StreamError> for ConversationError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Cancelled => ConversationError::Cancelled,
            other => ConversationError::Streaming(other.to_string()),
        }
    }
}
