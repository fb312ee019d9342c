//! Command normalization
//!
//! Turns a raw transcript into the canonical form the intent rules match
//! against, while keeping the original text for display and search.

/// Words that mark a transcript as a question
const INTERROGATIVES: [&str; 6] = ["what", "when", "where", "who", "why", "how"];

/// A transcribed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Trimmed transcript with its original casing
    pub raw: String,
    /// Lower-cased transcript, with `?` appended to questions
    pub normalized: String,
}

impl Command {
    /// Normalize a raw transcript
    ///
    /// Callers must only pass text that is non-empty after trimming; the
    /// dispatch loop skips blank transcripts before getting here.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();

        let normalized = if is_question(&lower) && !lower.ends_with('?') {
            format!("{lower}?")
        } else {
            lower
        };

        Self {
            raw: trimmed.to_string(),
            normalized,
        }
    }

    /// The command as echoed back to the user
    ///
    /// Original casing, with the `?` normalization added to questions.
    #[must_use]
    pub fn formatted(&self) -> String {
        if self.normalized.ends_with('?') && !self.raw.ends_with('?') {
            format!("{}?", self.raw)
        } else {
            self.raw.clone()
        }
    }
}

/// Whether lower-cased text opens with an interrogative word
fn is_question(lower: &str) -> bool {
    INTERROGATIVES.iter().any(|word| lower.starts_with(word))
}
