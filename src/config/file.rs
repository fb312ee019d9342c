//! TOML configuration file loading
//!
//! Supports `~/.config/voice-assist/config.toml` as a persistent config
//! source. All fields are optional; the file is a partial overlay on top of
//! defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct AssistConfigFile {
    /// Listening behavior
    #[serde(default)]
    pub listen: ListenFileConfig,

    /// Speech-to-text settings
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Text-to-speech settings
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// Web search settings
    #[serde(default)]
    pub search: SearchFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Listening configuration
#[derive(Debug, Default, Deserialize)]
pub struct ListenFileConfig {
    /// Seconds to wait for speech to start
    pub timeout_secs: Option<u64>,

    /// Milliseconds of ambient noise sampled before each listen
    pub ambient_calibration_ms: Option<u64>,

    /// Longest utterance in seconds
    pub max_utterance_secs: Option<u64>,
}

/// Speech-to-text configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// "whisper" or "deepgram"
    pub provider: Option<String>,

    /// Model identifier
    pub model: Option<String>,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Text-to-speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// "openai", "elevenlabs", or "none"
    pub provider: Option<String>,

    /// Model identifier
    pub model: Option<String>,

    /// Voice identifier
    pub voice: Option<String>,

    /// Speed multiplier
    pub speed: Option<f32>,

    /// Service URL override
    pub endpoint: Option<String>,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Web search configuration
#[derive(Debug, Default, Deserialize)]
pub struct SearchFileConfig {
    /// URL template containing `{query}`
    pub url_template: Option<String>,

    /// Open the browser, or only print the URL
    pub open_browser: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file
///
/// Reads `path` if given, otherwise the standard location. Returns
/// `AssistConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file(path: Option<&Path>) -> AssistConfigFile {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return AssistConfigFile::default();
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file");
        return AssistConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                AssistConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            AssistConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/voice-assist/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voice-assist").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listen]
timeout_secs = 8

[tts]
provider = "none"
"#
        )
        .unwrap();

        let config = load_config_file(Some(file.path()));
        assert_eq!(config.listen.timeout_secs, Some(8));
        assert_eq!(config.tts.provider.as_deref(), Some("none"));
        assert!(config.stt.provider.is_none());
        assert!(config.api_keys.openai.is_none());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_file(Some(&dir.path().join("absent.toml")));
        assert!(config.listen.timeout_secs.is_none());
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listen\ntimeout_secs = ").unwrap();

        let config = load_config_file(Some(file.path()));
        assert!(config.listen.timeout_secs.is_none());
    }
}
