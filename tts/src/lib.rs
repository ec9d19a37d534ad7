//! Speech synthesis through the ElevenLabs text-to-speech API.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";

/// Voice used when no voice id is configured.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

const MODEL_ID: &str = "eleven_multilingual_v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, Error)]
pub enum TtsError {
    #[error("speech synthesis is not configured")]
    NotConfigured,
    #[error("speech synthesis failed with status {status}: {message}")]
    Failed { status: u16, message: String },
    #[error("speech synthesis timed out")]
    TimedOut,
    #[error("speech service unreachable: {0}")]
    Unreachable(String),
}

/// Convenience result type used throughout this crate.
pub type Result<T> = std::result::Result<T, TtsError>;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` with the given voice and return the audio bytes.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>>;
}

/// Client for the ElevenLabs synthesis endpoint.
#[derive(Clone)]
pub struct ElevenLabsTts {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl ElevenLabsTts {
    /// Create a client for the hosted API. `synthesize` returns
    /// [`TtsError::NotConfigured`] without touching the network when no key
    /// is set.
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, ELEVENLABS_API_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(serde::Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTts {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TtsError::NotConfigured)?;

        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id);
        info!(%url, "requesting speech synthesis");
        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", key)
            .header("accept", "audio/mpeg")
            .timeout(self.timeout)
            .json(&SynthesisRequest {
                text,
                model_id: MODEL_ID,
            })
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TtsError::Failed {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await.map_err(classify_transport_error)?;
        Ok(bytes.to_vec())
    }
}

fn classify_transport_error(e: reqwest::Error) -> TtsError {
    if e.is_timeout() {
        TtsError::TimedOut
    } else {
        TtsError::Unreachable(e.to_string())
    }
}
