//! Dispatch loop
//!
//! Orchestrates capture → transcribe → normalize → classify → act, one
//! utterance at a time, until an exit command stops it.

use std::time::Duration;

use chrono::{DateTime, Local};

use super::{
    Capture, Clock, Command, Intent, Output, RecognitionError, SearchLauncher, SystemClock,
    Transcriber, classify, classify_error, format_date, format_time,
};
use crate::Result;

/// Default wait for speech onset
const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Response to a greeting
pub const GREETING: &str = "Hello! How can I help you today?";

/// Response to an exit command
pub const FAREWELL: &str = "Goodbye!";

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Capturing,
    Transcribing,
    Normalizing,
    Classifying,
    Acting,
    ErrorHandling,
    /// Terminal; reached only through [`Intent::Exit`]
    Stopped,
}

/// Outcome of a single loop iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// An intent was acted on and the loop is idle again
    Handled(Intent),
    /// Recognition failed; the user was told and the loop is idle again
    Recovered(super::FailureKind),
    /// Nothing actionable was said
    Skipped,
    /// The loop has stopped
    Stopped,
}

/// Spoken response for the current time
#[must_use]
pub fn time_response(now: &DateTime<Local>) -> String {
    format!("The time is {}", format_time(now))
}

/// Spoken response for the current date
#[must_use]
pub fn date_response(now: &DateTime<Local>) -> String {
    format!("Today's date is {}", format_date(now))
}

/// Acknowledgment spoken before a search is opened
#[must_use]
pub fn search_response(query: &str) -> String {
    format!("I'm looking up {query} on the web.")
}

/// The voice assistant
pub struct Assistant<C, T, O, S> {
    capture: C,
    transcriber: T,
    output: O,
    search: S,
    clock: Box<dyn Clock>,
    listen_timeout: Duration,
    state: LoopState,
}

impl<C, T, O, S> Assistant<C, T, O, S>
where
    C: Capture,
    T: Transcriber,
    O: Output,
    S: SearchLauncher,
{
    /// Create an assistant from its collaborators
    #[must_use]
    pub fn new(capture: C, transcriber: T, output: O, search: S) -> Self {
        Self {
            capture,
            transcriber,
            output,
            search,
            clock: Box::new(SystemClock),
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
            state: LoopState::Idle,
        }
    }

    /// Use a different time source
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Set how long each capture waits for speech
    #[must_use]
    pub const fn with_listen_timeout(mut self, timeout: Duration) -> Self {
        self.listen_timeout = timeout;
        self
    }

    /// Current loop state
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// The capture source
    #[must_use]
    pub const fn capture(&self) -> &C {
        &self.capture
    }

    /// The output sink
    #[must_use]
    pub const fn output(&self) -> &O {
        &self.output
    }

    /// The search launcher
    #[must_use]
    pub const fn search(&self) -> &S {
        &self.search
    }

    /// Run until an exit command is heard
    ///
    /// # Errors
    ///
    /// Returns error only if the capture device fails; recognition failures
    /// are handled inside the loop
    #[allow(clippy::future_not_send)]
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!(timeout = ?self.listen_timeout, "assistant listening");

        while self.state != LoopState::Stopped {
            let turn = self.step().await?;
            tracing::debug!(?turn, "turn complete");
        }

        tracing::info!("assistant stopped");
        Ok(())
    }

    /// Run a single iteration of the loop
    ///
    /// # Errors
    ///
    /// Returns error if the capture device fails
    #[allow(clippy::future_not_send)]
    pub async fn step(&mut self) -> Result<Turn> {
        if self.state == LoopState::Stopped {
            return Ok(Turn::Stopped);
        }

        match self.listen().await? {
            Ok(transcript) => Ok(self.handle(&transcript).await),
            Err(e) => Ok(self.recover(&e).await),
        }
    }

    /// Capture and transcribe one utterance
    #[allow(clippy::future_not_send)]
    async fn listen(&mut self) -> Result<std::result::Result<String, RecognitionError>> {
        self.transition(LoopState::Capturing);
        self.output.notice("Listening...");

        let captured = match self.capture.capture(self.listen_timeout).await {
            Ok(captured) => captured,
            Err(e) => {
                self.transition(LoopState::Idle);
                return Err(e);
            }
        };

        let Some(utterance) = captured else {
            return Ok(Err(RecognitionError::Timeout(self.listen_timeout)));
        };

        tracing::debug!(duration = ?utterance.duration(), "utterance captured");
        self.transition(LoopState::Transcribing);
        Ok(self.transcriber.transcribe(utterance).await)
    }

    /// Normalize, classify and act on a transcript
    #[allow(clippy::future_not_send)]
    async fn handle(&mut self, transcript: &str) -> Turn {
        if transcript.trim().is_empty() {
            tracing::debug!("blank transcript, skipping");
            self.transition(LoopState::Idle);
            return Turn::Skipped;
        }

        self.transition(LoopState::Normalizing);
        let command = Command::normalize(transcript);
        self.output.notice(&format!("You said: {}", command.formatted()));

        self.transition(LoopState::Classifying);
        let intent = classify(&command);
        tracing::info!(intent = intent.name(), command = %command.raw, "command classified");

        self.transition(LoopState::Acting);
        self.act(&intent).await;

        match intent {
            Intent::Exit => {
                self.transition(LoopState::Stopped);
                Turn::Stopped
            }
            Intent::Empty => {
                self.transition(LoopState::Idle);
                Turn::Skipped
            }
            other => {
                self.transition(LoopState::Idle);
                Turn::Handled(other)
            }
        }
    }

    /// Carry out an intent
    #[allow(clippy::future_not_send)]
    async fn act(&mut self, intent: &Intent) {
        match intent {
            Intent::Greeting => self.output.emit(GREETING).await,
            Intent::TellTime => {
                let response = time_response(&self.clock.now());
                self.output.emit(&response).await;
            }
            Intent::TellDate => {
                let response = date_response(&self.clock.now());
                self.output.emit(&response).await;
            }
            Intent::WebSearch(query) => {
                self.output.emit(&search_response(query)).await;
                self.search.search(query).await;
            }
            Intent::Exit => self.output.emit(FAREWELL).await,
            Intent::Empty => {}
        }
    }

    /// Tell the user what went wrong and go back to idle
    #[allow(clippy::future_not_send)]
    async fn recover(&mut self, error: &RecognitionError) -> Turn {
        self.transition(LoopState::ErrorHandling);

        let failure = classify_error(error);
        tracing::warn!(error = %error, kind = ?failure.kind, "recognition failed");
        self.output.emit(failure.message).await;

        self.transition(LoopState::Idle);
        Turn::Recovered(failure.kind)
    }

    fn transition(&mut self, next: LoopState) {
        tracing::trace!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }
}
