use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;
use std::pin::Pin;
use thiserror::Error;

/// Lazy, finite, non-restartable sequence of text increments.
///
/// Increments arrive in the order the provider emitted them. A failure during
/// consumption surfaces as one terminal `Err` item; nothing follows it.
/// Dropping the stream releases the underlying connection.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, CompletionError>> + Send>>;

#[derive(Clone, Debug, Error)]
pub enum CompletionError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("provider error: {0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response")]
    InvalidResponse,
    #[error("unexpected error: {0}")]
    Unknown(String),
}

/// One generation request: system instructions, the user turn, and limits.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            model: model.into(),
            max_tokens,
        }
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Open a generation request and return the reply as a stream of
    /// increments.
    async fn stream_message(
        &self,
        request: CompletionRequest,
    ) -> Result<TextStream, CompletionError>;

    /// Drain the stream and return the full answer. Equals the in-order
    /// concatenation of every increment [`Self::stream_message`] would
    /// produce for the same request.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let mut stream = self.stream_message(request).await?;
        let mut full = String::new();
        while let Some(chunk) = stream.next().await {
            full.push_str(&chunk?);
        }
        Ok(full)
    }
}
