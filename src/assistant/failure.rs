//! Recognition failure taxonomy
//!
//! Every failure between "start listening" and "got text" is recoverable:
//! the loop speaks the mapped message and listens again.

use std::time::Duration;

use thiserror::Error;

/// Spoken when nothing was captured in the listen window
pub const TIMEOUT_MESSAGE: &str = "No audio detected. Please try again.";

/// Spoken when speech could not be resolved to text
pub const UNINTELLIGIBLE_MESSAGE: &str = "Sorry, I could not understand the audio.";

/// Spoken when the speech-to-text service could not be reached
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "Could not request results; check your network connection.";

/// A failed attempt to turn speech into text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// No utterance captured within the wait window
    #[error("no speech captured within {0:?}")]
    Timeout(Duration),

    /// Audio captured but the service returned no usable text
    #[error("speech could not be understood")]
    Unintelligible,

    /// Speech-to-text service unreachable or failing
    #[error("speech service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Kind of recoverable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Unintelligible,
    ServiceUnavailable,
}

/// A failure paired with what to tell the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedFailure {
    pub kind: FailureKind,
    pub message: &'static str,
}

/// Map a recognition failure to its kind and spoken message
#[must_use]
pub const fn classify_error(error: &RecognitionError) -> ClassifiedFailure {
    match error {
        RecognitionError::Timeout(_) => ClassifiedFailure {
            kind: FailureKind::Timeout,
            message: TIMEOUT_MESSAGE,
        },
        RecognitionError::Unintelligible => ClassifiedFailure {
            kind: FailureKind::Unintelligible,
            message: UNINTELLIGIBLE_MESSAGE,
        },
        RecognitionError::ServiceUnavailable(_) => ClassifiedFailure {
            kind: FailureKind::ServiceUnavailable,
            message: SERVICE_UNAVAILABLE_MESSAGE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let timeout = classify_error(&RecognitionError::Timeout(Duration::from_secs(5)));
        assert_eq!(timeout.kind, FailureKind::Timeout);
        assert_eq!(timeout.message, "No audio detected. Please try again.");

        let unintelligible = classify_error(&RecognitionError::Unintelligible);
        assert_eq!(unintelligible.kind, FailureKind::Unintelligible);
        assert_eq!(
            unintelligible.message,
            "Sorry, I could not understand the audio."
        );

        let unavailable =
            classify_error(&RecognitionError::ServiceUnavailable("dns".to_string()));
        assert_eq!(unavailable.kind, FailureKind::ServiceUnavailable);
        assert_eq!(
            unavailable.message,
            "Could not request results; check your network connection."
        );
    }
}
