//! HTTP client for the Anthropic Messages API.
//!
//! This module provides the [`AnthropicClient`] type which implements the
//! [`CompletionClient`] trait. It opens a streaming `/v1/messages` request
//! and decodes the server-sent event frames into text increments.

use crate::traits::{CompletionClient, CompletionError, CompletionRequest, TextStream};
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl AnthropicClient {
    /// Create a client for the hosted API. A missing key is not an error
    /// here; it surfaces as [`CompletionError::Auth`] when a request is made.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, ANTHROPIC_API_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.into(),
        }
    }
}

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    stream: bool,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn stream_message(
        &self,
        request: CompletionRequest,
    ) -> Result<TextStream, CompletionError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CompletionError::Auth("no API key configured".into()))?;

        let body = MessagesBody {
            model: &request.model,
            max_tokens: request.max_tokens,
            stream: true,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.user,
            }],
        };

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() || e.is_request() {
                    CompletionError::Network(e.to_string())
                } else {
                    CompletionError::Unknown(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        Ok(sse_text_stream(resp))
    }
}

/// Map a non-2xx response to an error kind, surfacing the provider's own
/// message when the body carries one.
async fn error_from_response(resp: reqwest::Response) -> CompletionError {
    let status = resp.status().as_u16();
    let message = match resp.json::<Value>().await {
        Ok(body) => body["error"]["message"]
            .as_str()
            .unwrap_or("no detail provided")
            .to_string(),
        Err(_) => "no detail provided".to_string(),
    };
    match status {
        401 | 403 => CompletionError::Auth(message),
        429 => CompletionError::RateLimited(message),
        _ => CompletionError::Api(message),
    }
}

enum Frame {
    Delta(String),
    Stop,
    Fail(CompletionError),
    Skip,
}

/// Decode one SSE frame (the lines between blank-line delimiters).
fn parse_frame(frame: &str) -> Frame {
    let mut data = String::new();
    for line in frame.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            data.push_str(rest.trim());
        }
    }
    if data.is_empty() {
        return Frame::Skip;
    }
    let value: Value = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(_) => return Frame::Skip,
    };
    match value["type"].as_str() {
        Some("content_block_delta") => match value["delta"]["text"].as_str() {
            Some(text) => Frame::Delta(text.to_string()),
            None => Frame::Skip,
        },
        Some("message_stop") => Frame::Stop,
        Some("error") => {
            let message = value["error"]["message"]
                .as_str()
                .unwrap_or("stream aborted by provider")
                .to_string();
            Frame::Fail(CompletionError::Api(message))
        }
        Some(_) => Frame::Skip,
        None => Frame::Fail(CompletionError::InvalidResponse),
    }
}

struct SseState<S> {
    inner: S,
    buf: Vec<u8>,
    pending: VecDeque<Result<String, CompletionError>>,
    done: bool,
}

/// Byte offset of the first blank-line frame delimiter, if a full frame is
/// buffered.
fn frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

/// Turn the raw byte stream of an event-stream response into text
/// increments. Exactly one `Err` item may appear and it is always last.
///
/// Bytes are buffered raw and only complete frames are decoded as UTF-8, so
/// a multi-byte character split across network chunks is reassembled before
/// conversion.
fn sse_text_stream(resp: reqwest::Response) -> TextStream {
    let state = SseState {
        inner: resp.bytes_stream().boxed(),
        buf: Vec::new(),
        pending: VecDeque::new(),
        done: false,
    };
    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                if item.is_err() {
                    st.done = true;
                    st.pending.clear();
                }
                return Some((item, st));
            }
            if st.done {
                return None;
            }
            match st.inner.next().await {
                Some(Ok(bytes)) => {
                    st.buf.extend_from_slice(&bytes);
                    while let Some(pos) = frame_end(&st.buf) {
                        let raw: Vec<u8> = st.buf.drain(..pos + 2).collect();
                        let frame = String::from_utf8_lossy(&raw);
                        match parse_frame(&frame) {
                            Frame::Delta(text) => st.pending.push_back(Ok(text)),
                            Frame::Stop => {
                                st.done = true;
                                break;
                            }
                            Frame::Fail(err) => {
                                st.pending.push_back(Err(err));
                                break;
                            }
                            Frame::Skip => {}
                        }
                    }
                }
                Some(Err(e)) => {
                    st.pending
                        .push_back(Err(CompletionError::Network(e.to_string())));
                }
                None => st.done = true,
            }
        }
    }))
}
