//! Console speech engines
//!
//! Reference implementations of the injected speech interfaces for hosts
//! without a platform speech stack: the synthesizer prints the utterance and
//! completes after a length-proportional delay, and the recognizer treats
//! typed lines as spoken phrases. Both honor the same contracts a real
//! engine would, so the session logic is identical either way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::AsyncBufReadExt;
use tokio::sync::{mpsc, oneshot};

use crate::session::speech::Synthesizer;
use crate::session::voice::{Recognizer, RecognizerEvent};
use crate::Result;

/// Prints utterances, pacing completion by text length
pub struct ConsoleSynthesizer {
    pace: Duration,
    // Dropping the sender cancels the in-flight utterance's completion
    cancel: Mutex<Option<oneshot::Sender<()>>>,
}

impl ConsoleSynthesizer {
    /// Create a synthesizer pacing at `pace_ms` milliseconds per character
    #[must_use]
    pub fn new(pace_ms: u64) -> Self {
        Self {
            pace: Duration::from_millis(pace_ms),
            cancel: Mutex::new(None),
        }
    }
}

impl Synthesizer for ConsoleSynthesizer {
    fn speak(&self, text: &str, done: Box<dyn FnOnce() + Send>) {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        // Replacing the previous sender drops it, cancelling that utterance
        *self.cancel.lock().expect("cancel mutex") = Some(cancel_tx);

        println!("\u{1f50a} {text}");
        let duration = self.pace.saturating_mul(u32::try_from(text.len()).unwrap_or(u32::MAX));
        tokio::spawn(async move {
            tokio::select! {
                // Cancellation wins when both are ready
                biased;
                _ = &mut cancel_rx => {}
                () = tokio::time::sleep(duration) => done(),
            }
        });
    }

    fn cancel(&self) {
        self.cancel.lock().expect("cancel mutex").take();
    }
}

/// Treats stdin lines as recognized utterances
pub struct ConsoleRecognizer {
    running: AtomicBool,
}

impl ConsoleRecognizer {
    /// Spawn the stdin reader and return the recognizer with its event
    /// stream
    ///
    /// Must be called inside a tokio runtime. End-of-input is reported as a
    /// stream termination, like a real engine timing out.
    #[must_use]
    pub fn spawn() -> (Arc<Self>, mpsc::UnboundedReceiver<RecognizerEvent>) {
        let recognizer = Arc::new(Self {
            running: AtomicBool::new(false),
        });
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let reader = Arc::clone(&recognizer);
        tokio::spawn(async move {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if reader.running.load(Ordering::SeqCst)
                            && event_tx.send(RecognizerEvent::Transcript(line)).is_err()
                        {
                            break;
                        }
                    }
                    Ok(None) => {
                        let _ = event_tx.send(RecognizerEvent::Ended);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        let _ = event_tx.send(RecognizerEvent::Ended);
                        break;
                    }
                }
            }
            tracing::debug!("console recognizer input ended");
        });

        (recognizer, event_rx)
    }
}

impl Recognizer for ConsoleRecognizer {
    fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
