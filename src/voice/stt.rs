//! Speech-to-text (STT) over HTTP
//!
//! Transport failures and server errors surface as
//! [`RecognitionError::ServiceUnavailable`]; rejected or silent audio as
//! [`RecognitionError::Unintelligible`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::samples_to_wav;
use crate::assistant::{RecognitionError, Transcriber, Utterance};
use crate::config::{ApiKeys, SttConfig};
use crate::{Error, Result};

const WHISPER_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const DEEPGRAM_URL: &str = "https://api.deepgram.com/v1/listen";

/// Response from `OpenAI` Whisper transcription API
#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Response from Deepgram transcription API
#[derive(Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// STT provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SttProvider {
    #[default]
    Whisper,
    Deepgram,
}

impl SttProvider {
    /// Model used when none is configured
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Whisper => "whisper-1",
            Self::Deepgram => "nova-2",
        }
    }
}

impl FromStr for SttProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "whisper" | "openai" => Ok(Self::Whisper),
            "deepgram" => Ok(Self::Deepgram),
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }
}

impl fmt::Display for SttProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whisper => f.write_str("whisper"),
            Self::Deepgram => f.write_str("deepgram"),
        }
    }
}

/// Transcribes speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: String,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create a client for the given provider
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing or the HTTP client cannot be built
    pub fn new(
        provider: SttProvider,
        api_key: String,
        model: String,
        request_timeout: Duration,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(format!("{provider} API key required for STT")));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            model,
            provider,
        })
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is not configured
    pub fn from_config(config: &SttConfig, keys: &ApiKeys) -> Result<Self> {
        let key = match config.provider {
            SttProvider::Whisper => keys.openai.clone(),
            SttProvider::Deepgram => keys.deepgram.clone(),
        };

        Self::new(
            config.provider,
            key.unwrap_or_default(),
            config.model.clone(),
            config.request_timeout,
        )
    }

    /// Transcribe WAV audio to text
    ///
    /// # Errors
    ///
    /// Returns error if the service is unreachable or rejects the audio
    pub async fn transcribe_wav(
        &self,
        audio: Vec<u8>,
    ) -> std::result::Result<String, RecognitionError> {
        tracing::debug!(
            provider = %self.provider,
            audio_bytes = audio.len(),
            "starting transcription"
        );

        let request = match self.provider {
            SttProvider::Whisper => {
                let part = reqwest::multipart::Part::bytes(audio)
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| RecognitionError::ServiceUnavailable(e.to_string()))?;
                let form = reqwest::multipart::Form::new()
                    .part("file", part)
                    .text("model", self.model.clone());

                self.client
                    .post(WHISPER_URL)
                    .bearer_auth(&self.api_key)
                    .multipart(form)
            }
            SttProvider::Deepgram => self
                .client
                .post(DEEPGRAM_URL)
                .query(&[("model", self.model.as_str()), ("punctuate", "true")])
                .header("Authorization", format!("Token {}", self.api_key))
                .header("Content-Type", "audio/wav")
                .body(audio),
        };

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, "STT request failed");
            RecognitionError::ServiceUnavailable(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RecognitionError::ServiceUnavailable(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "STT API error");
            return Err(status_error(status, &body));
        }

        let transcript = parse_transcript(self.provider, &body)
            .map_err(|e| RecognitionError::ServiceUnavailable(e.to_string()))?;

        if transcript.trim().is_empty() {
            return Err(RecognitionError::Unintelligible);
        }

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

#[async_trait(?Send)]
impl Transcriber for SpeechToText {
    async fn transcribe(
        &self,
        utterance: Utterance,
    ) -> std::result::Result<String, RecognitionError> {
        let wav = samples_to_wav(&utterance.samples, utterance.sample_rate).map_err(|e| {
            tracing::warn!(error = %e, "failed to encode utterance");
            RecognitionError::Unintelligible
        })?;

        self.transcribe_wav(wav).await
    }
}

/// Map a failed HTTP status to a recognition error
///
/// The providers answer 400/422 when the audio itself cannot be decoded.
fn status_error(status: StatusCode, body: &str) -> RecognitionError {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            RecognitionError::Unintelligible
        }
        _ => RecognitionError::ServiceUnavailable(format!("{status}: {body}")),
    }
}

/// Extract the transcript from a provider response body
fn parse_transcript(provider: SttProvider, body: &str) -> Result<String> {
    match provider {
        SttProvider::Whisper => {
            let response: WhisperResponse = serde_json::from_str(body)?;
            Ok(response.text)
        }
        SttProvider::Deepgram => {
            let response: DeepgramResponse = serde_json::from_str(body)?;
            Ok(response
                .results
                .channels
                .into_iter()
                .next()
                .and_then(|c| c.alternatives.into_iter().next())
                .map(|a| a.transcript)
                .unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("whisper".parse::<SttProvider>().unwrap(), SttProvider::Whisper);
        assert_eq!(" Deepgram ".parse::<SttProvider>().unwrap(), SttProvider::Deepgram);
        assert!("sphinx".parse::<SttProvider>().is_err());
    }

    #[test]
    fn test_missing_key_rejected() {
        let result = SpeechToText::new(
            SttProvider::Whisper,
            String::new(),
            "whisper-1".to_string(),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_whisper() {
        let text = parse_transcript(SttProvider::Whisper, r#"{"text":"hello there"}"#).unwrap();
        assert_eq!(text, "hello there");
    }

    #[test]
    fn test_parse_deepgram() {
        let body = r#"{"results":{"channels":[{"alternatives":[{"transcript":"what time is it"}]}]}}"#;
        let text = parse_transcript(SttProvider::Deepgram, body).unwrap();
        assert_eq!(text, "what time is it");

        let empty = parse_transcript(SttProvider::Deepgram, r#"{"results":{"channels":[]}}"#)
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::BAD_REQUEST, "bad audio"),
            RecognitionError::Unintelligible
        );
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, "down"),
            RecognitionError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "bad key"),
            RecognitionError::ServiceUnavailable(_)
        ));
    }
}
