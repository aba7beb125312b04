//! Guided cooking session controller
//!
//! One logical event loop multiplexes every asynchronous source the session
//! has: recognizer events, utterance completions, the 1-second timer tick,
//! translation results, and UI control requests. Events are processed one at
//! a time, so a dispatched command always reads the latest committed state.
//!
//! The surrounding UI holds a [`SessionHandle`]: control requests go in
//! through an mpsc channel, and a read-only [`SessionSnapshot`] comes back
//! through a watch channel after every processed event.

pub mod dispatch;
pub mod recipe;
pub mod speech;
pub mod timer;
pub mod translate;
pub mod voice;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::api::{Recipe, Translator};
use crate::Result;
use self::dispatch::Command;
use self::recipe::RecipeSession;
use self::speech::{SpeechOutput, Synthesizer, UtteranceId};
use self::timer::{CountdownTimer, TimerState, TimerTick};
use self::translate::TranslationCache;
use self::voice::{Recognizer, RecognizerEvent, VoiceInputController};

/// Spoken when a countdown completes
const TIMER_FINISHED_PHRASE: &str = "Timer finished!";

/// Spoken when a step has no discoverable duration
const NO_DURATION_PHRASE: &str = "No time detected in this step.";

/// Control request from the surrounding UI
#[derive(Debug, Clone)]
pub enum ControlRequest {
    /// Move to the next step
    Advance,
    /// Move to the previous step
    Retreat,
    /// Read the current step aloud
    ReadStep,
    /// Start a countdown from the current step's duration
    StartTimerFromStep,
    /// Toggle the countdown between running and paused
    PauseResumeTimer,
    /// Discard the countdown
    CancelTimer,
    /// Toggle voice listening
    ToggleListening,
    /// Speak arbitrary text
    Speak(String),
    /// Stop speech output
    StopSpeech,
    /// Switch the display language
    SetTargetLanguage(String),
    /// End the session
    Shutdown,
}

/// Read-only view of the session, published after every processed event
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Recipe display name
    pub recipe_name: String,
    /// Zero-based current step index
    pub current_index: usize,
    /// Total number of steps
    pub step_count: usize,
    /// Whether the cursor is on the first step
    pub is_first: bool,
    /// Whether the cursor is on the last step
    pub is_last: bool,
    /// Current step text in the source language
    pub current_step_text: String,
    /// Step text in the active language (source text until a translation
    /// resolves)
    pub displayed_text: String,
    /// Active display language
    pub target_language: String,
    /// Whether a translation for the displayed step is in flight
    pub translating: bool,
    /// Countdown state, if one is armed
    pub timer: Option<TimerState>,
    /// Whether the countdown completed (cleared by a new start or cancel)
    pub timer_finished: bool,
    /// Whether voice listening is on
    pub listening: bool,
    /// Whether a recognition engine is available at all
    pub voice_available: bool,
    /// Whether microphone permission was refused
    pub permission_denied: bool,
    /// Whether an utterance is live
    pub speaking: bool,
    /// Most recent normalized transcript
    pub last_transcript: Option<String>,
}

/// Cloneable handle the UI drives the session through
#[derive(Clone)]
pub struct SessionHandle {
    control_tx: mpsc::Sender<ControlRequest>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Send one control request
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SessionClosed`] if the event loop has ended.
    pub async fn send(&self, request: ControlRequest) -> Result<()> {
        self.control_tx
            .send(request)
            .await
            .map_err(|_| crate::Error::SessionClosed)
    }

    /// Latest published snapshot
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Watch receiver for snapshot updates
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }
}

/// Engines and collaborators injected into a session
pub struct SessionEngines {
    /// Speech synthesis engine
    pub synthesizer: Arc<dyn Synthesizer>,
    /// Speech recognition engine, `None` on hosts without one
    pub recognizer: Option<Arc<dyn Recognizer>>,
    /// Events from the recognition engine; must be `Some` whenever
    /// `recognizer` is
    pub recognizer_events: Option<mpsc::UnboundedReceiver<RecognizerEvent>>,
    /// Translation collaborator
    pub translator: Arc<dyn Translator>,
}

/// Result of one spawned translation fetch, routed back onto the loop
#[derive(Debug)]
struct Translated {
    step_index: usize,
    language: String,
    outcome: std::result::Result<String, String>,
}

/// The session event loop and all state it owns
pub struct SessionController {
    recipe: RecipeSession,
    timer: CountdownTimer,
    speech: SpeechOutput,
    voice: VoiceInputController,
    cache: Arc<TranslationCache>,

    target_language: String,
    displayed_translation: Option<String>,
    translating: bool,
    timer_finished: bool,

    control_rx: mpsc::Receiver<ControlRequest>,
    recognizer_rx: mpsc::UnboundedReceiver<RecognizerEvent>,
    recognizer_open: bool,
    utterance_rx: mpsc::UnboundedReceiver<UtteranceId>,
    translated_tx: mpsc::UnboundedSender<Translated>,
    translated_rx: mpsc::UnboundedReceiver<Translated>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    /// Build a session over a loaded recipe
    ///
    /// The returned controller must be driven with [`Self::run`]; the handle
    /// is the UI's side of the session.
    #[must_use]
    pub fn new(
        recipe: Recipe,
        source_language: impl Into<String>,
        engines: SessionEngines,
    ) -> (Self, SessionHandle) {
        let source_language = source_language.into();
        let recipe = RecipeSession::new(recipe.name, recipe.instructions);
        let (speech, utterance_rx) = SpeechOutput::with_receiver(engines.synthesizer);
        let voice = VoiceInputController::new(engines.recognizer);
        let cache = Arc::new(TranslationCache::new(
            source_language.clone(),
            engines.translator,
        ));

        let (recognizer_rx, recognizer_open) = match engines.recognizer_events {
            Some(rx) => (rx, true),
            None => (mpsc::unbounded_channel().1, false),
        };

        let (control_tx, control_rx) = mpsc::channel(16);
        let (translated_tx, translated_rx) = mpsc::unbounded_channel();

        let mut controller = Self {
            recipe,
            timer: CountdownTimer::new(),
            speech,
            voice,
            cache,
            target_language: source_language,
            displayed_translation: None,
            translating: false,
            timer_finished: false,
            control_rx,
            recognizer_rx,
            recognizer_open,
            utterance_rx,
            translated_tx,
            translated_rx,
            snapshot_tx: watch::channel(SessionSnapshot {
                recipe_name: String::new(),
                current_index: 0,
                step_count: 0,
                is_first: true,
                is_last: true,
                current_step_text: String::new(),
                displayed_text: String::new(),
                target_language: String::new(),
                translating: false,
                timer: None,
                timer_finished: false,
                listening: false,
                voice_available: false,
                permission_denied: false,
                speaking: false,
                last_transcript: None,
            })
            .0,
        };
        controller.publish();

        let handle = SessionHandle {
            control_tx,
            snapshot_rx: controller.snapshot_tx.subscribe(),
        };
        (controller, handle)
    }

    /// Run the event loop until shutdown
    ///
    /// Teardown is scoped to every exit path: listening intent is cleared
    /// before the recognition stream stops, active speech is cancelled, and
    /// the timer tick dies with the loop.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature leaves room for fatal engine
    /// failures.
    pub async fn run(mut self) -> Result<()> {
        tracing::info!(
            recipe = self.recipe.name(),
            steps = self.recipe.step_count(),
            "cooking session started"
        );

        let mut tick = tokio::time::interval(Duration::from_secs(1));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first interval tick fires immediately; consume it so the
        // countdown only sees whole seconds.
        tick.tick().await;

        loop {
            tokio::select! {
                request = self.control_rx.recv() => {
                    match request {
                        Some(ControlRequest::Shutdown) | None => break,
                        Some(request) => self.handle_control(request),
                    }
                    self.publish();
                }
                _ = tick.tick() => {
                    self.handle_tick();
                    self.publish();
                }
                event = self.recognizer_rx.recv(), if self.recognizer_open => {
                    match event {
                        Some(event) => {
                            if let Some(transcript) = self.voice.handle_event(event) {
                                self.handle_transcript(&transcript);
                            }
                        }
                        None => {
                            tracing::debug!("recognizer event channel closed");
                            self.recognizer_open = false;
                        }
                    }
                    self.publish();
                }
                Some(id) = self.utterance_rx.recv() => {
                    self.speech.on_utterance_done(id);
                    self.publish();
                }
                Some(translated) = self.translated_rx.recv() => {
                    self.handle_translated(translated);
                    self.publish();
                }
            }
        }

        self.voice.shutdown();
        self.speech.stop();
        self.timer.cancel();
        self.publish();
        tracing::info!("cooking session ended");
        Ok(())
    }

    fn handle_control(&mut self, request: ControlRequest) {
        match request {
            ControlRequest::Advance => self.advance(),
            ControlRequest::Retreat => self.retreat(),
            ControlRequest::ReadStep => self.read_step(),
            ControlRequest::StartTimerFromStep => self.start_timer_from_step(),
            ControlRequest::PauseResumeTimer => self.timer.pause_resume(),
            ControlRequest::CancelTimer => {
                self.timer.cancel();
                self.timer_finished = false;
            }
            ControlRequest::ToggleListening => self.voice.toggle_listening(),
            ControlRequest::Speak(text) => self.speech.speak(&text),
            ControlRequest::StopSpeech => self.speech.stop(),
            ControlRequest::SetTargetLanguage(language) => self.set_target_language(language),
            ControlRequest::Shutdown => unreachable!("handled by the loop"),
        }
    }

    /// Apply one normalized transcript, first matching rule wins
    fn handle_transcript(&mut self, transcript: &str) {
        let Some(command) = Command::parse(transcript) else {
            tracing::debug!(transcript, "transcript matched no command");
            return;
        };
        tracing::info!(?command, transcript, "voice command");
        match command {
            Command::NextStep => self.advance(),
            Command::PreviousStep => self.retreat(),
            Command::RepeatStep => self.read_step(),
            Command::StartTimer => self.start_timer_from_step(),
            Command::StopSpeech => self.speech.stop(),
        }
    }

    fn advance(&mut self) {
        if self.recipe.advance() {
            self.speech.stop();
            self.on_step_changed();
        }
    }

    fn retreat(&mut self) {
        if self.recipe.retreat() {
            self.speech.stop();
            self.on_step_changed();
        }
    }

    fn read_step(&mut self) {
        let text = self.recipe.current_step_text().to_string();
        self.speech.speak(&text);
    }

    fn start_timer_from_step(&mut self) {
        match self.timer.start_from_text(self.recipe.current_step_text()) {
            Ok(minutes) => {
                self.timer_finished = false;
                self.speech
                    .speak(&format!("Starting timer for {minutes} minutes."));
            }
            Err(crate::Error::NoDurationFound) => {
                self.speech.speak(NO_DURATION_PHRASE);
            }
            Err(e) => {
                tracing::warn!(error = %e, "timer start failed");
            }
        }
    }

    fn handle_tick(&mut self) {
        if let Some(TimerTick::Finished) = self.timer.tick() {
            tracing::info!("timer finished");
            self.timer_finished = true;
            self.speech.speak(TIMER_FINISHED_PHRASE);
        }
    }

    fn set_target_language(&mut self, language: String) {
        if language == self.target_language {
            return;
        }
        tracing::info!(%language, "display language changed");
        self.target_language = language;
        self.displayed_translation = None;
        self.translating = false;
        self.request_translation();
    }

    /// Navigation landed on a new step: drop the old translation and keep
    /// the displayed text in the active language automatically
    fn on_step_changed(&mut self) {
        self.displayed_translation = None;
        self.translating = false;
        self.request_translation();
    }

    fn request_translation(&mut self) {
        if self.target_language == self.cache.source_language() || self.recipe.step_count() == 0 {
            return;
        }
        let step_index = self.recipe.current_index();
        let language = self.target_language.clone();
        let text = self.recipe.current_step_text().to_string();
        self.translating = true;

        let cache = Arc::clone(&self.cache);
        let translated_tx = self.translated_tx.clone();
        tokio::spawn(async move {
            let outcome = cache
                .get(step_index, &language, &text)
                .await
                .map_err(|e| e.to_string());
            // Loop gone means the session ended; nothing to deliver to
            let _ = translated_tx.send(Translated {
                step_index,
                language,
                outcome,
            });
        });
    }

    fn handle_translated(&mut self, translated: Translated) {
        let current = translated.step_index == self.recipe.current_index()
            && translated.language == self.target_language;
        if !current {
            // Stale result from rapid navigation; the cache kept it anyway
            return;
        }
        self.translating = false;
        match translated.outcome {
            Ok(text) => self.displayed_translation = Some(text),
            Err(message) => {
                // Keep showing the source or last-good text
                tracing::warn!(error = %message, "translation failed; showing source text");
            }
        }
    }

    fn publish(&mut self) {
        let snapshot = SessionSnapshot {
            recipe_name: self.recipe.name().to_string(),
            current_index: self.recipe.current_index(),
            step_count: self.recipe.step_count(),
            is_first: self.recipe.is_first(),
            is_last: self.recipe.is_last(),
            current_step_text: self.recipe.current_step_text().to_string(),
            displayed_text: self
                .displayed_translation
                .clone()
                .unwrap_or_else(|| self.recipe.current_step_text().to_string()),
            target_language: self.target_language.clone(),
            translating: self.translating,
            timer: self.timer.state(),
            timer_finished: self.timer_finished,
            listening: self.voice.is_listening(),
            voice_available: self.voice.is_available(),
            permission_denied: self.voice.permission_denied(),
            speaking: self.speech.is_speaking(),
            last_transcript: self.voice.last_transcript().map(String::from),
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}
