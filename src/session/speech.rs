//! Speech output with single-utterance arbitration
//!
//! All spoken feedback in the session routes through [`SpeechOutput`] so the
//! at-most-one-utterance invariant holds system-wide. Starting a new
//! utterance cancels the previous one; a superseded utterance's completion
//! callback is ignored even if the engine races its cancel.

use std::sync::Arc;

use tokio::sync::mpsc;

/// Monotonic identifier for one unit of synthesized speech
pub type UtteranceId = u64;

/// Platform speech-synthesis engine, injected so the session is testable
/// without real audio hardware
pub trait Synthesizer: Send + Sync {
    /// Begin speaking `text`; call `done` once on natural completion.
    /// A cancelled utterance must not invoke `done`.
    fn speak(&self, text: &str, done: Box<dyn FnOnce() + Send>);

    /// Cancel the active utterance, if any. Idempotent.
    fn cancel(&self);
}

/// Drives the audio-output device, enforcing one live utterance
pub struct SpeechOutput {
    engine: Arc<dyn Synthesizer>,
    done_tx: mpsc::UnboundedSender<UtteranceId>,
    next_id: UtteranceId,
    active: Option<UtteranceId>,
}

impl SpeechOutput {
    /// Create the speech output together with its completion-event receiver
    ///
    /// The session loop consumes the receiver and feeds every id back into
    /// [`Self::on_utterance_done`].
    #[must_use]
    pub fn with_receiver(
        engine: Arc<dyn Synthesizer>,
    ) -> (Self, mpsc::UnboundedReceiver<UtteranceId>) {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        (
            Self {
                engine,
                done_tx,
                next_id: 0,
                active: None,
            },
            done_rx,
        )
    }

    /// Speak `text`, cancelling any active utterance first
    pub fn speak(&mut self, text: &str) {
        self.engine.cancel();
        self.next_id += 1;
        let id = self.next_id;
        self.active = Some(id);

        let done_tx = self.done_tx.clone();
        self.engine.speak(
            text,
            Box::new(move || {
                let _ = done_tx.send(id);
            }),
        );
        tracing::debug!(utterance = id, text, "speaking");
    }

    /// Cancel the active utterance; idempotent when nothing is speaking
    pub fn stop(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!("speech stopped");
        }
        self.engine.cancel();
    }

    /// Record natural completion of an utterance
    ///
    /// Completions from superseded utterances carry a stale id and are
    /// dropped.
    pub fn on_utterance_done(&mut self, id: UtteranceId) {
        if self.active == Some(id) {
            self.active = None;
            tracing::debug!(utterance = id, "utterance finished");
        }
    }

    /// Whether an utterance is currently live
    #[must_use]
    pub const fn is_speaking(&self) -> bool {
        self.active.is_some()
    }
}
