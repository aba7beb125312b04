//! Cookmode - hands-free guided cooking session controller
//!
//! Drives a user through a recipe's steps by voice: continuous recognition
//! feeds a command dispatcher that navigates steps, reads them aloud, and
//! runs per-step countdown timers, while an on-demand translation cache
//! keeps the displayed step in the user's language.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   Surrounding UI                     │
//! │        SessionHandle  │  SessionSnapshot (watch)     │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │              SessionController (one loop)            │
//! │  Voice in │ Dispatch │ Steps │ Timer │ Speech out    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │          Injected engines & backend                  │
//! │  Recognizer │ Synthesizer │ /recipe │ /translate     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Everything asynchronous (microphone events, utterance completions, the
//! 1-second tick, translation responses) lands on one event loop, processed
//! in arrival order.

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod session;

pub use api::{HttpTranslator, Recipe, RecipeClient, Translator};
pub use config::Config;
pub use console::{ConsoleRecognizer, ConsoleSynthesizer};
pub use error::{Error, Result};
pub use session::dispatch::Command;
pub use session::recipe::{RecipeSession, NO_INSTRUCTIONS};
pub use session::speech::{SpeechOutput, Synthesizer, UtteranceId};
pub use session::timer::{extract_minutes, CountdownTimer, TimerState, TimerTick};
pub use session::translate::TranslationCache;
pub use session::voice::{
    ListeningState, Recognizer, RecognizerErrorKind, RecognizerEvent, VoiceInputController,
};
pub use session::{
    ControlRequest, SessionController, SessionEngines, SessionHandle, SessionSnapshot,
};
