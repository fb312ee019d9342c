//! Text-to-speech (TTS) processing

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::config::{ApiKeys, TtsConfig};
use crate::{Error, Result};

const OPENAI_SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
const ELEVENLABS_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

/// TTS provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TtsProvider {
    OpenAI,
    ElevenLabs,
}

impl TtsProvider {
    /// Parse a provider name, where `none` disables speech
    ///
    /// # Errors
    ///
    /// Returns error for an unknown provider name
    pub fn parse_optional(name: &str) -> Result<Option<Self>> {
        match name.trim().to_lowercase().as_str() {
            "" | "none" | "off" => Ok(None),
            other => other.parse().map(Some),
        }
    }

    /// Model used when none is configured
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "tts-1",
            Self::ElevenLabs => "eleven_monolingual_v1",
        }
    }

    /// Service URL used when none is configured
    #[must_use]
    pub const fn default_endpoint(self) -> &'static str {
        match self {
            Self::OpenAI => OPENAI_SPEECH_URL,
            Self::ElevenLabs => ELEVENLABS_URL,
        }
    }

    /// Voice used when none is configured
    #[must_use]
    pub const fn default_voice(self) -> &'static str {
        match self {
            Self::OpenAI => "alloy",
            Self::ElevenLabs => "21m00Tcm4TlvDq8ikWAM",
        }
    }
}

impl FromStr for TtsProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "elevenlabs" => Ok(Self::ElevenLabs),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => f.write_str("openai"),
            Self::ElevenLabs => f.write_str("elevenlabs"),
        }
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
}

#[derive(Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    speed: f32,
    model: String,
    provider: TtsProvider,
    endpoint: String,
    request_timeout: Duration,
}

impl TextToSpeech {
    /// Create a synthesizer from configuration
    ///
    /// Returns `None` when speech output is disabled.
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing or the HTTP client
    /// cannot be built
    pub fn from_config(config: &TtsConfig, keys: &ApiKeys) -> Result<Option<Self>> {
        let Some(provider) = config.provider else {
            return Ok(None);
        };

        let api_key = match provider {
            TtsProvider::OpenAI => keys.openai.clone(),
            TtsProvider::ElevenLabs => keys.elevenlabs.clone(),
        }
        .unwrap_or_default();

        if api_key.is_empty() {
            return Err(Error::Config(format!("{provider} API key required for TTS")));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Some(Self {
            client,
            api_key,
            voice: config.voice.clone(),
            speed: config.speed,
            model: config.model.clone(),
            provider,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| provider.default_endpoint().to_string()),
            request_timeout: config.request_timeout,
        }))
    }

    /// Upper bound on a single synthesis request
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Synthesize text to MP3 audio
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = match self.provider {
            TtsProvider::OpenAI => self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&OpenAiRequest {
                    model: &self.model,
                    input: text,
                    voice: &self.voice,
                    speed: self.speed,
                }),
            TtsProvider::ElevenLabs => self
                .client
                .post(format!("{}/{}", self.endpoint, self.voice))
                .header("xi-api-key", &self.api_key)
                .json(&ElevenLabsRequest {
                    text,
                    model_id: &self.model,
                }),
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("{} error {status}: {body}", self.provider)));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), provider = %self.provider, "speech synthesized");
        Ok(audio.to_vec())
    }
}
