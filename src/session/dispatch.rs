//! Voice command interpretation
//!
//! A normalized transcript is matched against a fixed-order rule list; the
//! first matching rule wins and the rest are never consulted. A transcript
//! matching no rule is discarded silently.

/// A recognized voice command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move to the next step, stopping any active speech
    NextStep,
    /// Move to the previous step, stopping any active speech
    PreviousStep,
    /// Read the current step aloud
    RepeatStep,
    /// Start a countdown from the current step's duration
    StartTimer,
    /// Stop speech output only; the timer and listening state are untouched
    StopSpeech,
}

impl Command {
    /// Match `transcript` against the rule list, first hit wins
    ///
    /// Rule order is load-bearing: "start the timer" must land on
    /// [`Command::StartTimer`] even though a later rule matches "stop"-free
    /// phrases, and "stop" is checked last.
    #[must_use]
    pub fn parse(transcript: &str) -> Option<Self> {
        if transcript.contains("next") {
            Some(Self::NextStep)
        } else if transcript.contains("back") || transcript.contains("previous") {
            Some(Self::PreviousStep)
        } else if transcript.contains("repeat") || transcript.contains("read") {
            Some(Self::RepeatStep)
        } else if transcript.contains("timer") && transcript.contains("start") {
            Some(Self::StartTimer)
        } else if transcript.contains("stop") {
            Some(Self::StopSpeech)
        } else {
            None
        }
    }
}
