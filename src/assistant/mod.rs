//! The listen–transcribe–classify–dispatch core
//!
//! The loop depends only on the collaborator traits defined here. Concrete
//! adapters live in [`crate::voice`], [`crate::output`], and
//! [`crate::search`]; tests drive the loop with scripted doubles.

mod clock;
mod command;
mod dispatch;
mod failure;
mod intent;

use std::time::Duration;

use async_trait::async_trait;

pub use clock::{Clock, SystemClock, format_date, format_time};
pub use command::Command;
pub use dispatch::{
    Assistant, FAREWELL, GREETING, LoopState, Turn, date_response, search_response,
    time_response,
};
pub use failure::{
    ClassifiedFailure, FailureKind, RecognitionError, SERVICE_UNAVAILABLE_MESSAGE,
    TIMEOUT_MESSAGE, UNINTELLIGIBLE_MESSAGE, classify_error,
};
pub use intent::{Intent, classify};

use crate::Result;

/// One captured segment of speech
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Mono samples in `[-1.0, 1.0]`
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Utterance {
    /// Duration of the captured audio
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }
}

/// Source of utterances
#[async_trait(?Send)]
pub trait Capture {
    /// Wait up to `timeout` for speech and return the utterance
    ///
    /// Returns `Ok(None)` when nothing was said in time.
    ///
    /// # Errors
    ///
    /// Returns error if the capture device fails
    async fn capture(&mut self, timeout: Duration) -> Result<Option<Utterance>>;
}

/// Speech-to-text service
#[async_trait(?Send)]
pub trait Transcriber {
    /// Transcribe an utterance, consuming it
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::Unintelligible`] or
    /// [`RecognitionError::ServiceUnavailable`]
    async fn transcribe(
        &self,
        utterance: Utterance,
    ) -> std::result::Result<String, RecognitionError>;
}

/// Where responses go
#[async_trait(?Send)]
pub trait Output {
    /// Deliver a response to the user
    async fn emit(&mut self, text: &str);

    /// Show a status line that is not part of the spoken conversation
    fn notice(&mut self, _text: &str) {}
}

/// Opens web searches
#[async_trait(?Send)]
pub trait SearchLauncher {
    /// Start a search for `query`
    async fn search(&self, query: &str);
}
