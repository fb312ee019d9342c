//! Configuration management for the voice assistant
//!
//! Values resolve env > TOML file > default.

pub mod file;

use std::path::Path;
use std::time::Duration;

use crate::search::DEFAULT_SEARCH_URL;
use crate::voice::{SttProvider, TtsProvider};
use crate::{Error, Result};

use file::AssistConfigFile;

/// Voice assistant configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Listening behavior
    pub listen: ListenConfig,

    /// Speech-to-text settings
    pub stt: SttConfig,

    /// Text-to-speech settings
    pub tts: TtsConfig,

    /// Web search settings
    pub search: SearchConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Listening configuration
#[derive(Debug, Clone)]
pub struct ListenConfig {
    /// How long to wait for speech to start
    pub timeout: Duration,

    /// Ambient noise sampled before each listen (zero disables calibration)
    pub ambient_calibration: Duration,

    /// Utterances are cut off after this long
    pub max_utterance: Duration,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            ambient_calibration: Duration::from_secs(1),
            max_utterance: Duration::from_secs(15),
        }
    }
}

/// Speech-to-text configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// Transcription backend
    pub provider: SttProvider,

    /// Model identifier (e.g. "whisper-1", "nova-2")
    pub model: String,

    /// Upper bound on a single transcription request
    pub request_timeout: Duration,
}

impl Default for SttConfig {
    fn default() -> Self {
        let provider = SttProvider::default();
        Self {
            provider,
            model: provider.default_model().to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Synthesis backend; `None` prints responses without speaking
    pub provider: Option<TtsProvider>,

    /// Model identifier
    pub model: String,

    /// Voice identifier
    pub voice: String,

    /// Speed multiplier (`OpenAI` only, 0.25 to 4.0)
    pub speed: f32,

    /// Service URL override for compatible self-hosted servers
    pub endpoint: Option<String>,

    /// Upper bound on a single synthesis request
    pub request_timeout: Duration,
}

impl Default for TtsConfig {
    fn default() -> Self {
        let provider = TtsProvider::OpenAI;
        Self {
            provider: Some(provider),
            model: provider.default_model().to_string(),
            voice: provider.default_voice().to_string(),
            speed: 1.0,
            endpoint: None,
            request_timeout: Duration::from_secs(20),
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// URL template containing `{query}`
    pub url_template: String,

    /// Open the browser; when false the URL is only printed
    pub open_browser: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_SEARCH_URL.to_string(),
            open_browser: true,
        }
    }
}

/// API keys for external services
#[derive(Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper and TTS)
    pub openai: Option<String>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<String>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("ApiKeys")
            .field("openai", &redact(&self.openai))
            .field("deepgram", &redact(&self.deepgram))
            .field("elevenlabs", &redact(&self.elevenlabs))
            .finish()
    }
}

impl Config {
    /// Load configuration from the standard file location and environment
    ///
    /// # Errors
    ///
    /// Returns error if a provider name is not recognized
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading the TOML file at `path` if given
    ///
    /// # Errors
    ///
    /// Returns error if a provider name is not recognized
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(path);
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a provider name is not recognized or a numeric
    /// environment override does not parse
    pub fn from_sources(
        fc: AssistConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = ListenConfig::default();

        // Listening (env > toml > default)
        let timeout = match env("ASSIST_LISTEN_TIMEOUT") {
            Some(raw) => Duration::from_secs(raw.trim().parse().map_err(|_| {
                Error::Config(format!("ASSIST_LISTEN_TIMEOUT is not a number of seconds: {raw}"))
            })?),
            None => fc
                .listen
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
        };
        let listen = ListenConfig {
            timeout,
            ambient_calibration: fc
                .listen
                .ambient_calibration_ms
                .map_or(defaults.ambient_calibration, Duration::from_millis),
            max_utterance: fc
                .listen
                .max_utterance_secs
                .map_or(defaults.max_utterance, Duration::from_secs),
        };

        // STT (env > toml > default)
        let stt_provider = env("ASSIST_STT_PROVIDER")
            .or(fc.stt.provider)
            .map(|name| name.parse::<SttProvider>())
            .transpose()?
            .unwrap_or_default();
        let stt = SttConfig {
            provider: stt_provider,
            model: env("ASSIST_STT_MODEL")
                .or(fc.stt.model)
                .unwrap_or_else(|| stt_provider.default_model().to_string()),
            request_timeout: fc
                .stt
                .request_timeout_secs
                .map_or_else(|| SttConfig::default().request_timeout, Duration::from_secs),
        };

        // TTS (env > toml > default)
        let tts_provider = match env("ASSIST_TTS_PROVIDER").or(fc.tts.provider) {
            Some(name) => TtsProvider::parse_optional(&name)?,
            None => TtsConfig::default().provider,
        };
        let tts = TtsConfig {
            provider: tts_provider,
            model: env("ASSIST_TTS_MODEL")
                .or(fc.tts.model)
                .or_else(|| tts_provider.map(|p| p.default_model().to_string()))
                .unwrap_or_default(),
            voice: env("ASSIST_TTS_VOICE")
                .or(fc.tts.voice)
                .or_else(|| tts_provider.map(|p| p.default_voice().to_string()))
                .unwrap_or_default(),
            speed: fc.tts.speed.unwrap_or(1.0).clamp(0.25, 4.0),
            endpoint: fc.tts.endpoint,
            request_timeout: fc
                .tts
                .request_timeout_secs
                .map_or_else(|| TtsConfig::default().request_timeout, Duration::from_secs),
        };

        let search = SearchConfig {
            url_template: env("ASSIST_SEARCH_URL")
                .or(fc.search.url_template)
                .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            open_browser: fc.search.open_browser.unwrap_or(true),
        };

        // API keys (env > toml > None)
        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY").or(fc.api_keys.openai),
            deepgram: env("DEEPGRAM_API_KEY").or(fc.api_keys.deepgram),
            elevenlabs: env("ELEVENLABS_API_KEY").or(fc.api_keys.elevenlabs),
        };

        Ok(Self {
            listen,
            stt,
            tts,
            search,
            api_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use super::file::{ApiKeysFileConfig, ListenFileConfig, SttFileConfig, TtsFileConfig};

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(AssistConfigFile::default(), env_of(&[])).unwrap();

        assert_eq!(config.listen.timeout, Duration::from_secs(5));
        assert_eq!(config.stt.provider, SttProvider::Whisper);
        assert_eq!(config.stt.model, "whisper-1");
        assert_eq!(config.tts.provider, Some(TtsProvider::OpenAI));
        assert_eq!(config.tts.voice, "alloy");
        assert_eq!(config.search.url_template, DEFAULT_SEARCH_URL);
        assert!(config.api_keys.openai.is_none());
    }

    #[test]
    fn test_env_beats_file() {
        let fc = AssistConfigFile {
            listen: ListenFileConfig {
                timeout_secs: Some(9),
                ..ListenFileConfig::default()
            },
            api_keys: ApiKeysFileConfig {
                openai: Some("from-file".to_string()),
                ..ApiKeysFileConfig::default()
            },
            ..AssistConfigFile::default()
        };

        let config = Config::from_sources(
            fc,
            env_of(&[("ASSIST_LISTEN_TIMEOUT", "3"), ("OPENAI_API_KEY", "from-env")]),
        )
        .unwrap();

        assert_eq!(config.listen.timeout, Duration::from_secs(3));
        assert_eq!(config.api_keys.openai.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_provider_defaults_follow_provider() {
        let fc = AssistConfigFile {
            stt: SttFileConfig {
                provider: Some("deepgram".to_string()),
                ..SttFileConfig::default()
            },
            tts: TtsFileConfig {
                provider: Some("elevenlabs".to_string()),
                ..TtsFileConfig::default()
            },
            ..AssistConfigFile::default()
        };

        let config = Config::from_sources(fc, env_of(&[])).unwrap();
        assert_eq!(config.stt.model, "nova-2");
        assert_eq!(config.tts.request_timeout, Duration::from_secs(20));
        assert_eq!(config.tts.model, "eleven_monolingual_v1");
    }

    #[test]
    fn test_request_timeouts_from_file() {
        let fc = AssistConfigFile {
            stt: SttFileConfig {
                request_timeout_secs: Some(9),
                ..SttFileConfig::default()
            },
            tts: TtsFileConfig {
                request_timeout_secs: Some(4),
                ..TtsFileConfig::default()
            },
            ..AssistConfigFile::default()
        };

        let config = Config::from_sources(fc, env_of(&[])).unwrap();
        assert_eq!(config.stt.request_timeout, Duration::from_secs(9));
        assert_eq!(config.tts.request_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_tts_can_be_disabled() {
        let config = Config::from_sources(
            AssistConfigFile::default(),
            env_of(&[("ASSIST_TTS_PROVIDER", "none")]),
        )
        .unwrap();
        assert!(config.tts.provider.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_provider = Config::from_sources(
            AssistConfigFile::default(),
            env_of(&[("ASSIST_STT_PROVIDER", "sphinx")]),
        );
        assert!(matches!(bad_provider, Err(Error::Config(_))));

        let bad_timeout = Config::from_sources(
            AssistConfigFile::default(),
            env_of(&[("ASSIST_LISTEN_TIMEOUT", "soon")]),
        );
        assert!(matches!(bad_timeout, Err(Error::Config(_))));
    }

    #[test]
    fn test_api_keys_redacted_in_debug() {
        let keys = ApiKeys {
            openai: Some("sk-secret".to_string()),
            ..ApiKeys::default()
        };
        let debug = format!("{keys:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("redacted"));
    }
}
