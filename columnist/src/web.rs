//! HTTP handlers: the JSON ask endpoint, the two event-stream endpoints, and
//! the voice endpoint.
//!
//! Every handler follows the same shape: validate the request fields, build
//! the upstream message for the chosen persona, call the injected adapter,
//! and translate the outcome into a response. Streaming handlers relay
//! increments one at a time and always end with exactly one terminal event.

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use futures::{StreamExt, stream};
use llm::{CompletionClient, CompletionError, CompletionRequest, TextStream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};
use tts::{SpeechSynthesizer, TtsError};

use crate::persona::Persona;

/// State shared across handlers. Adapters are injected so tests can
/// substitute scripted doubles; credentials live inside the adapters.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn CompletionClient>,
    pub tts: Arc<dyn SpeechSynthesizer>,
    pub model: String,
    pub max_tokens: u32,
    pub voice_id: String,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ask", post(ask))
        .route("/ask/stream", post(ask_stream))
        .route("/api/article", post(article))
        .route("/api/voice", post(voice))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

#[derive(Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    question: String,
}

#[derive(Deserialize)]
pub struct ArticleRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    question: String,
}

#[derive(Deserialize)]
pub struct VoiceRequest {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

fn completion_request(state: &AppState, persona: &Persona, user_message: String) -> CompletionRequest {
    CompletionRequest::new(
        persona.system_prompt,
        user_message,
        &state.model,
        state.max_tokens,
    )
}

/// User-facing message for a completion failure.
fn completion_error_message(err: &CompletionError) -> String {
    match err {
        CompletionError::Auth(_) => "API key is missing or invalid. Set ANTHROPIC_API_KEY.".into(),
        CompletionError::RateLimited(_) => "Rate limited. Please try again shortly.".into(),
        CompletionError::Api(message) => format!("API error: {message}"),
        CompletionError::Network(_) => "Could not connect to the API. Check your network.".into(),
        CompletionError::InvalidResponse | CompletionError::Unknown(_) => {
            "Something went wrong.".into()
        }
    }
}

fn completion_error_response(err: CompletionError) -> Response {
    error!(%err, "completion failed");
    let status = match &err {
        CompletionError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        CompletionError::Api(_) | CompletionError::Network(_) => StatusCode::BAD_GATEWAY,
        CompletionError::Auth(_)
        | CompletionError::InvalidResponse
        | CompletionError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorBody {
            error: completion_error_message(&err),
        }),
    )
        .into_response()
}

/// Synchronous column: block until the answer is complete, return it whole.
async fn ask(State(state): State<AppState>, Json(req): Json<AskRequest>) -> Response {
    let question = req.question.trim();
    if question.is_empty() {
        return bad_request("Please submit a question.");
    }
    info!("column question received");
    let persona = Persona::column();
    let request = completion_request(&state, &persona, persona.user_message(question, None, None));
    match state.llm.complete(request).await {
        Ok(text) => Json(serde_json::json!({ "response": text })).into_response(),
        Err(err) => completion_error_response(err),
    }
}

/// Streaming column: second-person persona, event-stream response.
async fn ask_stream(State(state): State<AppState>, Json(req): Json<AskRequest>) -> Response {
    let question = req.question.trim();
    if question.is_empty() {
        return bad_request("Please submit a question.");
    }
    info!("streaming column question received");
    let persona = Persona::column();
    let request = completion_request(&state, &persona, persona.user_message(question, None, None));
    relay(state.llm.as_ref(), request).await
}

/// Streaming feature article: third-person persona about a named reader.
async fn article(State(state): State<AppState>, Json(req): Json<ArticleRequest>) -> Response {
    let name = req.name.trim();
    let location = req.location.trim();
    let question = req.question.trim();
    if name.is_empty() || location.is_empty() || question.is_empty() {
        return bad_request("Please fill in your name, location, and question.");
    }
    info!(name, location, "article letter received");
    let persona = Persona::article();
    let request = completion_request(
        &state,
        &persona,
        persona.user_message(question, Some(name), Some(location)),
    );
    relay(state.llm.as_ref(), request).await
}

/// Open the upstream stream and shape it as an event-stream response. An
/// open failure still answers in-band, as a single terminal error event.
async fn relay(llm: &dyn CompletionClient, request: CompletionRequest) -> Response {
    match llm.stream_message(request).await {
        Ok(upstream) => event_stream_response(sse_body(upstream)),
        Err(err) => {
            error!(%err, "could not open completion stream");
            let frame = format!("data: [ERROR] {}\n\n", completion_error_message(&err));
            event_stream_response(Body::from(frame))
        }
    }
}

fn event_stream_response(body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// Relay upstream increments as `data:` frames, pulling the next increment
/// only after the previous frame has been handed off. Ends with exactly one
/// `[DONE]` or `[ERROR]` frame; the upstream stream is dropped at that point,
/// which releases its connection. If the client disconnects, the body stream
/// is dropped and the upstream stream goes with it.
fn sse_body(upstream: TextStream) -> Body {
    let frames = stream::unfold(Some(upstream), |state| async move {
        let mut upstream = state?;
        match upstream.next().await {
            Some(Ok(chunk)) => Some((format!("data: {chunk}\n\n"), Some(upstream))),
            Some(Err(err)) => Some((
                format!("data: [ERROR] {}\n\n", completion_error_message(&err)),
                None,
            )),
            None => Some(("data: [DONE]\n\n".to_string(), None)),
        }
    });
    Body::from_stream(frames.map(Ok::<_, Infallible>))
}

/// Voice endpoint: hand text to the synthesizer, return raw MP3 bytes.
async fn voice(State(state): State<AppState>, Json(req): Json<VoiceRequest>) -> Response {
    let text = req.text.trim();
    if text.is_empty() {
        return bad_request("Please provide text to read aloud.");
    }
    match state.tts.synthesize(text, &state.voice_id).await {
        Ok(audio) => ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response(),
        Err(err) => {
            error!(%err, "speech synthesis failed");
            let status = match &err {
                TtsError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
                TtsError::Failed { .. } | TtsError::Unreachable(_) => StatusCode::BAD_GATEWAY,
                TtsError::TimedOut => StatusCode::GATEWAY_TIMEOUT,
            };
            let message = match &err {
                TtsError::NotConfigured => {
                    "Voice is not configured. Set ELEVENLABS_API_KEY.".into()
                }
                _ => err.to_string(),
            };
            (status, Json(ErrorBody { error: message })).into_response()
        }
    }
}
