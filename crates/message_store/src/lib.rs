//! message_store - Async client for the external message persistence API
//!
//! The conversation engine persists messages through a narrow JSON contract:
//! - `POST` a new message `{id, role, content, createdAt}`
//! - `PATCH` a message's `{content, branches, currentBranchIndex}`
//! - `DELETE` a message by id
//!
//! `MessageStore` is the seam the orchestrators depend on; `HttpMessageStore`
//! is the production implementation with transient-failure retry. PATCH bodies
//! are idempotent, so retrying a branch write is always safe.

mod error;
mod http;
mod store;

pub use error::{Result, StoreError};
pub use http::HttpMessageStore;
pub use store::{MessagePatch, MessageStore, NewMessage};
