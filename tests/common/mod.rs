//! Shared test engines
//!
//! Scripted stand-ins for the platform speech stack and the translation
//! backend, so sessions run without audio hardware or a network.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use cookmode::{
    Recipe, Recognizer, RecognizerEvent, Result, SessionEngines, Synthesizer, Translator,
};

type DoneCallback = Box<dyn FnOnce() + Send>;

/// Synthesizer that records utterances and lets the test decide when (and
/// whether) each one completes
#[derive(Default)]
pub struct ScriptedSynth {
    spoken: Mutex<Vec<String>>,
    pending: Mutex<Option<DoneCallback>>,
}

impl ScriptedSynth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Everything spoken so far, in order
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    /// Number of utterances matching `text`
    pub fn count_of(&self, text: &str) -> usize {
        self.spoken.lock().unwrap().iter().filter(|s| s == &text).count()
    }

    /// Fire the pending utterance's natural completion
    pub fn finish_current(&self) {
        if let Some(done) = self.pending.lock().unwrap().take() {
            done();
        }
    }
}

impl Synthesizer for ScriptedSynth {
    fn speak(&self, text: &str, done: DoneCallback) {
        self.spoken.lock().unwrap().push(text.to_string());
        *self.pending.lock().unwrap() = Some(done);
    }

    fn cancel(&self) {
        self.pending.lock().unwrap().take();
    }
}

/// Recognizer that counts engine starts/stops; the test injects events
/// through the returned sender
pub struct ScriptedRecognizer {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub refuse_start: AtomicBool,
}

impl ScriptedRecognizer {
    pub fn with_events() -> (
        Arc<Self>,
        mpsc::UnboundedSender<RecognizerEvent>,
        mpsc::UnboundedReceiver<RecognizerEvent>,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                starts: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                refuse_start: AtomicBool::new(false),
            }),
            event_tx,
            event_rx,
        )
    }
}

impl Recognizer for ScriptedRecognizer {
    fn start(&self) -> Result<()> {
        if self.refuse_start.load(Ordering::SeqCst) {
            return Err(cookmode::Error::Recognition("engine busy".into()));
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Translator that tags text with the target language, counting calls
#[derive(Default)]
pub struct TaggingTranslator {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(cookmode::Error::Translation("backend down".into()));
        }
        Ok(format!("[{target_language}] {text}"))
    }
}

/// A five-step recipe with a timed simmer step
pub fn five_step_recipe() -> Recipe {
    serde_json::from_value(serde_json::json!({
        "name": "Paneer Butter Masala",
        "instructions": [
            "Soak the cashews in warm water.",
            "Blend tomatoes into a smooth puree.",
            "Simmer for 12 minutes on low heat.",
            "Add paneer cubes and cream.",
            "Garnish with kasuri methi and serve.",
        ],
    }))
    .expect("valid recipe json")
}

/// Engines wired from the scripted fakes
pub struct TestRig {
    pub synth: Arc<ScriptedSynth>,
    pub recognizer: Arc<ScriptedRecognizer>,
    pub events: mpsc::UnboundedSender<RecognizerEvent>,
    pub translator: Arc<TaggingTranslator>,
}

impl TestRig {
    pub fn new() -> (Self, SessionEngines) {
        let synth = ScriptedSynth::new();
        let (recognizer, events, event_rx) = ScriptedRecognizer::with_events();
        let translator = Arc::new(TaggingTranslator::default());

        let engines = SessionEngines {
            synthesizer: Arc::clone(&synth) as _,
            recognizer: Some(Arc::clone(&recognizer) as _),
            recognizer_events: Some(event_rx),
            translator: Arc::clone(&translator) as _,
        };
        (
            Self {
                synth,
                recognizer,
                events,
                translator,
            },
            engines,
        )
    }
}
