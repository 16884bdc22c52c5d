//! Wire chunk types for the streaming query API

use serde::{Deserialize, Serialize};

/// One chunk of a streamed answer.
///
/// Delta chunks carry the *full* partial response accumulated so far rather
/// than an increment, so a consumer can always overwrite its display with the
/// latest chunk and never has to stitch deltas together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Delta { partial: String },
    Sources { sources: Vec<SourceRef> },
    Done { response: String },
}

/// A retrieval hit backing the answer being produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub document_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}
