//! Voice processing module
//!
//! Microphone capture with speech endpointing, HTTP speech-to-text and
//! text-to-speech, and speaker playback.

mod capture;
mod detector;
mod playback;
mod stt;
mod tts;

pub use capture::{
    AudioCapture, Microphone, SAMPLE_RATE, SampleSource, record_utterance, samples_to_wav,
};
pub use detector::{DetectorState, SpeechDetector, calculate_energy};
pub use playback::{AudioPlayback, PLAYBACK_SAMPLE_RATE};
pub use stt::{SpeechToText, SttProvider};
pub use tts::{TextToSpeech, TtsProvider};
