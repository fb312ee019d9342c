//! Shared test utilities

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};

use voice_assist::{
    Assistant, Capture, Clock, Error, Output, RecognitionError, Result, SearchLauncher,
    Transcriber, Utterance,
};

/// Assistant wired to scripted doubles
pub type TestAssistant =
    Assistant<ScriptedCapture, ScriptedTranscriber, RecordingOutput, RecordingSearch>;

/// Half a second of non-silent audio
#[must_use]
pub fn utterance() -> Utterance {
    Utterance {
        samples: vec![0.2; 8000],
        sample_rate: 16000,
    }
}

/// Capture that replays a script; `None` entries simulate a timeout
pub struct ScriptedCapture {
    script: VecDeque<Option<Utterance>>,
    pub calls: usize,
    /// Timeout passed to each call, in order
    pub timeouts: Vec<Duration>,
}

#[async_trait(?Send)]
impl Capture for ScriptedCapture {
    async fn capture(&mut self, timeout: Duration) -> Result<Option<Utterance>> {
        self.calls += 1;
        self.timeouts.push(timeout);
        self.script
            .pop_front()
            .ok_or_else(|| Error::Audio("microphone unplugged".to_string()))
    }
}

/// Transcriber that replays scripted results in order
pub struct ScriptedTranscriber {
    results: RefCell<VecDeque<std::result::Result<String, RecognitionError>>>,
}

#[async_trait(?Send)]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(
        &self,
        _utterance: Utterance,
    ) -> std::result::Result<String, RecognitionError> {
        self.results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(RecognitionError::Unintelligible))
    }
}

/// Output that records everything it is given
#[derive(Default)]
pub struct RecordingOutput {
    pub emitted: Vec<String>,
    pub notices: Vec<String>,
}

#[async_trait(?Send)]
impl Output for RecordingOutput {
    async fn emit(&mut self, text: &str) {
        self.emitted.push(text.to_string());
    }

    fn notice(&mut self, text: &str) {
        self.notices.push(text.to_string());
    }
}

/// Search launcher that records queries
#[derive(Default)]
pub struct RecordingSearch {
    pub queries: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl SearchLauncher for RecordingSearch {
    async fn search(&self, query: &str) {
        self.queries.borrow_mut().push(query.to_string());
    }
}

/// Clock stuck at one instant
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// 2024-06-05 14:07:30 local time
#[must_use]
pub fn fixed_clock() -> FixedClock {
    FixedClock(
        Local
            .with_ymd_and_hms(2024, 6, 5, 14, 7, 30)
            .single()
            .expect("unambiguous local time"),
    )
}

/// Builds a matching capture and transcription script
#[derive(Default)]
pub struct Script {
    captures: VecDeque<Option<Utterance>>,
    results: VecDeque<std::result::Result<String, RecognitionError>>,
}

impl Script {
    /// The user says `text`
    #[must_use]
    pub fn say(mut self, text: &str) -> Self {
        self.captures.push_back(Some(utterance()));
        self.results.push_back(Ok(text.to_string()));
        self
    }

    /// Nobody speaks before the timeout
    #[must_use]
    pub fn silence(mut self) -> Self {
        self.captures.push_back(None);
        self
    }

    /// Audio is captured but the service cannot read it
    #[must_use]
    pub fn mumble(mut self) -> Self {
        self.captures.push_back(Some(utterance()));
        self.results.push_back(Err(RecognitionError::Unintelligible));
        self
    }

    /// Audio is captured but the service is unreachable
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.captures.push_back(Some(utterance()));
        self.results
            .push_back(Err(RecognitionError::ServiceUnavailable("connection refused".to_string())));
        self
    }

    /// Build an assistant that plays this script
    #[must_use]
    pub fn assistant(self) -> TestAssistant {
        let capture = ScriptedCapture {
            script: self.captures,
            calls: 0,
            timeouts: Vec::new(),
        };
        let transcriber = ScriptedTranscriber {
            results: RefCell::new(self.results),
        };

        Assistant::new(
            capture,
            transcriber,
            RecordingOutput::default(),
            RecordingSearch::default(),
        )
        .with_clock(fixed_clock())
        .with_listen_timeout(Duration::from_secs(5))
    }
}
