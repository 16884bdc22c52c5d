//! rag_client - Streaming client for the external RAG query service
//!
//! A query is answered as a server-sent event stream of discriminated chunks:
//! - `delta` chunks carrying the full partial response accumulated so far
//! - a `sources` chunk with the retrieval metadata backing the answer
//! - a terminal `done` chunk with the final response text
//!
//! `ResponseStreamer` is the seam the conversation orchestrators consume;
//! `HttpRagClient` is the production implementation. Streams are cancelled
//! cooperatively through a `CancellationToken`.

mod chunk;
mod client;
mod error;

pub use chunk::{SourceRef, StreamEvent};
pub use client::{HttpRagClient, ResponseStreamer};
pub use error::{Result, StreamError};
