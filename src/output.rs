//! Response sinks
//!
//! Every response is printed; [`SpokenOutput`] also reads it aloud.
//! Speech failures are logged and otherwise ignored.

use async_trait::async_trait;

use crate::assistant::Output;
use crate::voice::{AudioPlayback, TextToSpeech};

/// Prefix for printed responses
const RESPONSE_PREFIX: &str = "Assistant: ";

/// Prints responses and notices to stdout
#[derive(Debug, Default)]
pub struct ConsoleOutput;

#[async_trait(?Send)]
impl Output for ConsoleOutput {
    async fn emit(&mut self, text: &str) {
        println!("{RESPONSE_PREFIX}{text}");
    }

    fn notice(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Prints responses, then speaks them
pub struct SpokenOutput {
    console: ConsoleOutput,
    tts: TextToSpeech,
    playback: AudioPlayback,
}

impl SpokenOutput {
    #[must_use]
    pub const fn new(tts: TextToSpeech, playback: AudioPlayback) -> Self {
        Self {
            console: ConsoleOutput,
            tts,
            playback,
        }
    }
}

#[async_trait(?Send)]
impl Output for SpokenOutput {
    async fn emit(&mut self, text: &str) {
        self.console.emit(text).await;

        tracing::debug!(text, "speaking");
        let audio = match self.tts.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(error = %e, "speech synthesis failed");
                return;
            }
        };

        if let Err(e) = self.playback.play_mp3(&audio).await {
            tracing::warn!(error = %e, "speech playback failed");
        }
    }

    fn notice(&mut self, text: &str) {
        self.console.notice(text);
    }
}
