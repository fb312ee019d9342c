//! Voice Assist - a small voice-command assistant
//!
//! Listens for one utterance at a time, transcribes it, and answers a fixed
//! set of commands: greetings, the time, the date, web searches, and exit.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  Utterance  ┌──────────────┐  text  ┌──────────────────┐
//! │  Microphone  │────────────▶│ SpeechToText │───────▶│ Command / Intent │
//! └──────────────┘             └──────────────┘        └────────┬─────────┘
//!        ▲                      RecognitionError                 │
//!        │                              │                        ▼
//!        │                     ┌────────▼─────────┐     ┌──────────────────┐
//!        └──── Assistant ◀─────│ spoken recovery  │     │ Output / Search  │
//!                              └──────────────────┘     └──────────────────┘
//! ```

pub mod assistant;
pub mod config;
pub mod error;
pub mod output;
pub mod search;
pub mod voice;

pub use assistant::{
    Assistant, Capture, Clock, Command, Intent, LoopState, Output, RecognitionError,
    SearchLauncher, Transcriber, Turn, Utterance, classify, classify_error,
};
pub use config::Config;
pub use error::{Error, Result};
pub use output::{ConsoleOutput, SpokenOutput};
pub use search::BrowserSearch;
