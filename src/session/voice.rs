//! Continuous voice input with an explicit restart policy
//!
//! The controller is a two-state machine (`Idle` / `Listening`) over an
//! injected recognition engine. Listening intent is the single authority
//! consulted before any restart: an engine stream that terminates on its own
//! while intent is still on is restarted; a deliberate stop clears intent
//! before touching the engine, so the trailing end event cannot restart it.

use std::sync::Arc;

use crate::Result;

/// Why the recognition engine reported an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerErrorKind {
    /// Microphone access refused; listening is forced off, no auto-retry
    PermissionDenied,
    /// Transient engine condition; logged and ignored
    Transient,
}

/// Event emitted by the recognition engine onto the session loop
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    /// One recognized utterance, raw from the engine
    Transcript(String),
    /// Engine error
    Error(RecognizerErrorKind),
    /// The continuous stream terminated (engine timeout or similar)
    Ended,
}

/// Platform speech-recognition engine
///
/// Implementations deliver [`RecognizerEvent`]s on the channel wired up at
/// construction; `start`/`stop` control the continuous stream.
pub trait Recognizer: Send + Sync {
    /// Begin the continuous recognition stream
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses to start.
    fn start(&self) -> Result<()>;

    /// Stop the stream; a trailing [`RecognizerEvent::Ended`] may still be
    /// delivered
    fn stop(&self);
}

/// Listening state as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListeningState {
    /// Not listening
    Idle,
    /// Continuous recognition active (or restarting after an engine hiccup)
    Listening,
}

/// Owns the recognition stream and its restart policy
pub struct VoiceInputController {
    engine: Option<Arc<dyn Recognizer>>,
    state: ListeningState,
    last_transcript: Option<String>,
    permission_denied: bool,
}

impl VoiceInputController {
    /// Create the controller; `None` means no recognition capability on
    /// this host and the controller degrades to voice-disabled mode
    #[must_use]
    pub fn new(engine: Option<Arc<dyn Recognizer>>) -> Self {
        if engine.is_none() {
            tracing::warn!("no speech recognition engine; voice commands disabled");
        }
        Self {
            engine,
            state: ListeningState::Idle,
            last_transcript: None,
            permission_denied: false,
        }
    }

    /// Whether a recognition engine is available
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Whether the user intends to be listening
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state == ListeningState::Listening
    }

    /// Whether microphone permission was refused
    #[must_use]
    pub const fn permission_denied(&self) -> bool {
        self.permission_denied
    }

    /// Most recent normalized transcript
    #[must_use]
    pub fn last_transcript(&self) -> Option<&str> {
        self.last_transcript.as_deref()
    }

    /// Flip between listening and idle
    pub fn toggle_listening(&mut self) {
        if self.is_listening() {
            self.stop_listening();
        } else {
            self.start_listening();
        }
    }

    /// Begin listening; a no-op with a warning in voice-disabled mode
    pub fn start_listening(&mut self) {
        let Some(engine) = &self.engine else {
            tracing::warn!("voice disabled; ignoring listen request");
            return;
        };
        if self.state == ListeningState::Listening {
            return;
        }
        match engine.start() {
            Ok(()) => {
                self.state = ListeningState::Listening;
                tracing::info!("listening for voice commands");
            }
            Err(e) => {
                tracing::warn!(error = %e, "recognition engine refused to start");
            }
        }
    }

    /// Stop listening deliberately
    ///
    /// Intent is cleared before the engine stops so the termination event
    /// the engine fires afterwards does not restart the stream.
    pub fn stop_listening(&mut self) {
        self.state = ListeningState::Idle;
        if let Some(engine) = &self.engine {
            engine.stop();
        }
        tracing::info!("stopped listening");
    }

    /// Process one engine event; returns a normalized transcript when the
    /// event carries one
    pub fn handle_event(&mut self, event: RecognizerEvent) -> Option<String> {
        match event {
            RecognizerEvent::Transcript(raw) => {
                if self.state != ListeningState::Listening {
                    return None;
                }
                let transcript = normalize(&raw);
                if transcript.is_empty() {
                    return None;
                }
                tracing::debug!(%transcript, "heard");
                self.last_transcript = Some(transcript.clone());
                Some(transcript)
            }
            RecognizerEvent::Error(RecognizerErrorKind::PermissionDenied) => {
                self.state = ListeningState::Idle;
                if !self.permission_denied {
                    self.permission_denied = true;
                    tracing::error!("microphone access denied; voice commands off");
                }
                None
            }
            RecognizerEvent::Error(kind) => {
                tracing::warn!(?kind, "recognition error");
                None
            }
            RecognizerEvent::Ended => {
                if self.state == ListeningState::Listening {
                    // Unintended termination: restart, preserving Listening
                    // from the caller's perspective
                    if let Some(engine) = &self.engine {
                        if let Err(e) = engine.start() {
                            tracing::warn!(error = %e, "failed to restart recognition");
                        } else {
                            tracing::debug!("recognition stream restarted");
                        }
                    }
                }
                None
            }
        }
    }

    /// Tear down: clear intent, then stop the engine
    pub fn shutdown(&mut self) {
        if self.is_listening() {
            self.stop_listening();
        }
    }
}

/// Case-fold and trim a raw engine transcript
fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}
