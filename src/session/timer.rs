//! Per-step countdown timer
//!
//! The timer holds at most one [`TimerState`] and is driven by the session
//! loop's 1-second tick. Completion surfaces exactly once; re-arming after
//! completion requires a fresh `start`.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// First integer followed by an optional space and "min", case-insensitive
static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*min").expect("valid regex"));

/// Snapshot of a running or paused countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    /// Duration the timer was started with, in seconds
    pub original_secs: u32,
    /// Seconds left; `0 <= remaining_secs <= original_secs`
    pub remaining_secs: u32,
    /// Whether the countdown is ticking
    pub running: bool,
}

impl TimerState {
    /// Remaining time as `M:SS`
    #[must_use]
    pub fn format_remaining(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Decremented; seconds remaining
    Running(u32),
    /// Reached zero on this tick; fires once per `start`
    Finished,
}

/// Owns the session's single countdown
#[derive(Debug, Default)]
pub struct CountdownTimer {
    state: Option<TimerState>,
}

impl CountdownTimer {
    /// Create a timer with no countdown armed
    #[must_use]
    pub const fn new() -> Self {
        Self { state: None }
    }

    /// Arm a fresh countdown, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDuration`] if `seconds` is zero.
    pub fn start(&mut self, seconds: u32) -> Result<()> {
        if seconds == 0 {
            return Err(Error::InvalidDuration(seconds));
        }
        self.state = Some(TimerState {
            original_secs: seconds,
            remaining_secs: seconds,
            running: true,
        });
        tracing::info!(seconds, "timer started");
        Ok(())
    }

    /// Discover a duration in `text` and arm the countdown; returns the
    /// number of minutes found
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDurationFound`] if `text` carries no minute
    /// pattern, or [`Error::InvalidDuration`] for a literal "0 min".
    pub fn start_from_text(&mut self, text: &str) -> Result<u32> {
        let minutes = extract_minutes(text).ok_or(Error::NoDurationFound)?;
        self.start(minutes.saturating_mul(60))?;
        Ok(minutes)
    }

    /// Toggle running without resetting the remaining time
    ///
    /// A completed countdown stays stopped; it cannot be resumed back past
    /// zero.
    pub fn pause_resume(&mut self) {
        if let Some(state) = &mut self.state {
            if state.remaining_secs > 0 {
                state.running = !state.running;
                tracing::debug!(running = state.running, "timer toggled");
            }
        }
    }

    /// Discard the countdown entirely
    pub fn cancel(&mut self) {
        if self.state.take().is_some() {
            tracing::debug!("timer cancelled");
        }
    }

    /// Advance the countdown by one second
    ///
    /// Returns `None` when nothing is running. [`TimerTick::Finished`] is
    /// returned exactly once: reaching zero forces `running` off, so later
    /// ticks are no-ops until a new `start`.
    pub fn tick(&mut self) -> Option<TimerTick> {
        let state = self.state.as_mut().filter(|s| s.running)?;
        state.remaining_secs -= 1;
        if state.remaining_secs == 0 {
            state.running = false;
            Some(TimerTick::Finished)
        } else {
            Some(TimerTick::Running(state.remaining_secs))
        }
    }

    /// Current countdown, if one is armed
    #[must_use]
    pub const fn state(&self) -> Option<TimerState> {
        self.state
    }
}

/// Extract the first "N min" duration from step text
#[must_use]
pub fn extract_minutes(text: &str) -> Option<u32> {
    MINUTES_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_and_finishes_exactly_once() {
        let mut timer = CountdownTimer::new();
        timer.start(90).unwrap();

        for expected in (1..90).rev() {
            assert_eq!(timer.tick(), Some(TimerTick::Running(expected)));
        }
        assert_eq!(timer.tick(), Some(TimerTick::Finished));

        // Completed: no further completion events, state retained at zero
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.tick(), None);
        let state = timer.state().unwrap();
        assert_eq!(state.remaining_secs, 0);
        assert!(!state.running);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut timer = CountdownTimer::new();
        assert!(matches!(timer.start(0), Err(Error::InvalidDuration(0))));
        assert!(timer.state().is_none());
    }

    #[test]
    fn pause_resume_preserves_remaining() {
        let mut timer = CountdownTimer::new();
        timer.start(10).unwrap();
        timer.tick();
        timer.pause_resume();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.state().unwrap().remaining_secs, 9);

        timer.pause_resume();
        assert_eq!(timer.tick(), Some(TimerTick::Running(8)));
    }

    #[test]
    fn completed_timer_cannot_be_resumed() {
        let mut timer = CountdownTimer::new();
        timer.start(1).unwrap();
        assert_eq!(timer.tick(), Some(TimerTick::Finished));

        timer.pause_resume();
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn cancel_discards_state() {
        let mut timer = CountdownTimer::new();
        timer.start(30).unwrap();
        timer.cancel();
        assert!(timer.state().is_none());
        assert_eq!(timer.tick(), None);
    }

    #[test]
    fn extracts_first_minute_pattern() {
        assert_eq!(extract_minutes("Simmer for 12 minutes"), Some(12));
        assert_eq!(extract_minutes("bake 25 MIN at 180C"), Some(25));
        assert_eq!(extract_minutes("rest 5min, then knead 10 min"), Some(5));
        assert_eq!(extract_minutes("season to taste"), None);
    }

    #[test]
    fn start_from_text_converts_minutes_to_seconds() {
        let mut timer = CountdownTimer::new();
        let minutes = timer.start_from_text("Simmer for 12 minutes").unwrap();
        assert_eq!(minutes, 12);
        assert_eq!(timer.state().unwrap().original_secs, 720);
    }

    #[test]
    fn start_from_text_without_pattern_fails() {
        let mut timer = CountdownTimer::new();
        assert!(matches!(
            timer.start_from_text("Garnish with coriander"),
            Err(Error::NoDurationFound)
        ));
        assert!(timer.state().is_none());
    }

    #[test]
    fn formats_remaining_time() {
        let state = TimerState {
            original_secs: 720,
            remaining_secs: 665,
            running: true,
        };
        assert_eq!(state.format_remaining(), "11:05");
    }
}
