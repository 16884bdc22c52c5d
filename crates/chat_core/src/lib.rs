//! chat_core - Core types for the document chat system
//!
//! This crate provides the foundational types used across all chat-related crates:
//! - `message` - Message, Branch and Role for the conversation log
//! - `config` - runtime configuration for the external service clients

pub mod config;
pub mod message;

// Re-export commonly used types
pub use config::Config;
pub use message::{Branch, Message, Role};
