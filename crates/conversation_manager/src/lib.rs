//! conversation_manager - branch management for the document chat
//!
//! Users can edit a previous message or regenerate an assistant response
//! without losing history: alternate conversation paths are materialized as
//! branches layered on top of the linear message log, and a single displayed
//! sequence is re-derived from the annotated log on every mutation.
//!
//! The crate is built from three cooperating pieces:
//! - `reconcile` - the pure transform from raw log to displayed log
//! - `ConversationManager` - the edit/regenerate/select-branch orchestrators
//! - `ConversationEvent` - granular updates a frontend consumes to mirror
//!   in-flight streaming state

mod error;
mod events;
mod manager;
mod ops;
mod reconcile;
mod throttle;

pub use error::{ConversationError, Result};
pub use events::{ConversationEvent, EventSender};
pub use manager::ConversationManager;
pub use reconcile::reconcile;
pub use throttle::SaveGate;
