//! Intent classification
//!
//! A fixed, ordered rule table. The first rule whose predicate matches the
//! normalized command decides the intent, so rule order is the tie-break:
//! "hello what time is it" is a greeting, not a time request.

use super::Command;

/// Action the assistant takes for a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Respond with a greeting
    Greeting,
    /// Speak the current local time
    TellTime,
    /// Speak the current local date
    TellDate,
    /// Open a web search for the query
    WebSearch(String),
    /// Say goodbye and stop listening
    Exit,
    /// Nothing actionable in the command
    Empty,
}

impl Intent {
    /// Short name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::TellTime => "tell_time",
            Self::TellDate => "tell_date",
            Self::WebSearch(_) => "web_search",
            Self::Exit => "exit",
            Self::Empty => "empty",
        }
    }
}

/// A single classification rule
struct Rule {
    matches: fn(&str) -> bool,
    intent: fn(&Command) -> Intent,
}

/// Rules in priority order
const RULES: &[Rule] = &[
    Rule {
        matches: is_greeting,
        intent: |_| Intent::Greeting,
    },
    Rule {
        matches: |text| text.contains("time"),
        intent: |_| Intent::TellTime,
    },
    Rule {
        matches: |text| text.contains("date"),
        intent: |_| Intent::TellDate,
    },
    Rule {
        matches: |text| text.contains("exit") || text.contains("quit"),
        intent: |_| Intent::Exit,
    },
];

fn is_greeting(text: &str) -> bool {
    ["hello", "hey", "hi"].iter().any(|w| text.starts_with(w))
}

/// Classify a command into an intent
///
/// Anything no rule recognizes becomes a web search for `command.raw`, so the
/// `?` the normalizer appends to questions never leaks into the query.
#[must_use]
pub fn classify(command: &Command) -> Intent {
    let text = command.normalized.as_str();

    if !text.chars().any(char::is_alphanumeric) {
        return Intent::Empty;
    }

    RULES
        .iter()
        .find(|rule| (rule.matches)(text))
        .map_or_else(
            || Intent::WebSearch(command.raw.clone()),
            |rule| (rule.intent)(command),
        )
}
