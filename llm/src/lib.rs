//! Streaming chat completions from a hosted language model provider.
//!
//! The `llm` crate defines a [`CompletionClient`] trait along with the
//! concrete [`AnthropicClient`] implementation. A client opens one generation
//! request and exposes the reply as a lazy stream of text increments; the
//! stream releases its connection when dropped.

pub mod client;
pub mod traits;

pub use client::AnthropicClient;
pub use traits::{CompletionClient, CompletionError, CompletionRequest, TextStream};
