//! Memoizing, deduplicating translation cache
//!
//! Keyed by `(step index, language)`. The pending marker is the concurrency
//! guard: the first caller for a key claims the fetch, later callers attach
//! to the in-flight request instead of issuing a duplicate network call.
//! Resolved entries persist for the life of the session (bounded by step
//! count times language count). A failed fetch clears the marker so the next
//! trigger retries; errors are never cached.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::api::Translator;
use crate::{Error, Result};

type Key = (usize, String);
type Waiter = oneshot::Sender<std::result::Result<String, String>>;

enum Entry {
    /// Fetch in flight; at most one per key
    Pending(Vec<Waiter>),
    Resolved(String),
}

/// Session-scoped translation cache
pub struct TranslationCache {
    source_language: String,
    translator: Arc<dyn Translator>,
    entries: Mutex<HashMap<Key, Entry>>,
}

impl TranslationCache {
    /// Create a cache for one session
    #[must_use]
    pub fn new(source_language: impl Into<String>, translator: Arc<dyn Translator>) -> Self {
        Self {
            source_language: source_language.into(),
            translator,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Source language; requests for it bypass the cache entirely
    #[must_use]
    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Translation of one step, memoized and deduplicated
    ///
    /// `source_text` is the step's text in the source language; steps are
    /// immutable for the session's lifetime, so the index alone keys the
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Translation`] when the underlying fetch fails; the
    /// error is delivered to every attached waiter and nothing is cached.
    pub async fn get(&self, step_index: usize, language: &str, source_text: &str) -> Result<String> {
        if language == self.source_language {
            return Ok(source_text.to_string());
        }

        let key = (step_index, language.to_string());
        let attached = {
            let mut entries = self.entries.lock().expect("cache mutex");
            match entries.get_mut(&key) {
                Some(Entry::Resolved(text)) => return Ok(text.clone()),
                Some(Entry::Pending(waiters)) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    // Claim the fetch. Marking before awaiting is what makes
                    // the check-then-fetch atomic.
                    entries.insert(key.clone(), Entry::Pending(Vec::new()));
                    None
                }
            }
        };

        if let Some(rx) = attached {
            return match rx.await {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(message)) => Err(Error::Translation(message)),
                Err(_) => Err(Error::Translation("in-flight request dropped".into())),
            };
        }

        let outcome = self.translator.translate(source_text, language).await;

        let mut entries = self.entries.lock().expect("cache mutex");
        let waiters = match entries.remove(&key) {
            Some(Entry::Pending(waiters)) => waiters,
            _ => Vec::new(),
        };

        match outcome {
            Ok(text) => {
                entries.insert(key, Entry::Resolved(text.clone()));
                for waiter in waiters {
                    let _ = waiter.send(Ok(text.clone()));
                }
                Ok(text)
            }
            Err(e) => {
                // Marker already cleared; a later trigger may retry
                tracing::warn!(step = step_index, language, error = %e, "translation failed");
                let message = e.to_string();
                for waiter in waiters {
                    let _ = waiter.send(Err(message.clone()));
                }
                Err(Error::Translation(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;

    /// Translator that blocks until released, counting underlying calls
    struct GatedTranslator {
        calls: AtomicUsize,
        fail_next: AtomicBool,
        gate: Notify,
    }

    impl GatedTranslator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_next: AtomicBool::new(false),
                gate: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl Translator for GatedTranslator {
        async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(Error::Translation("backend down".into()));
            }
            Ok(format!("[{target_language}] {text}"))
        }
    }

    #[tokio::test]
    async fn source_language_bypasses_cache() {
        let translator = Arc::new(GatedTranslator::new());
        let cache = TranslationCache::new("en", Arc::clone(&translator) as _);

        let text = cache.get(0, "en", "Chop the onions").await.unwrap();
        assert_eq!(text, "Chop the onions");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_one_fetch() {
        let translator = Arc::new(GatedTranslator::new());
        let cache = Arc::new(TranslationCache::new("en", Arc::clone(&translator) as _));

        let first = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(2, "fr", "Simmer for 12 minutes").await }
        });
        let second = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(2, "fr", "Simmer for 12 minutes").await }
        });

        // Let both callers reach the cache before releasing the fetch
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        translator.gate.notify_waiters();

        let a = first.await.unwrap().unwrap();
        let b = second.await.unwrap().unwrap();
        assert_eq!(a, "[fr] Simmer for 12 minutes");
        assert_eq!(a, b);
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolved_entry_is_reused() {
        let translator = Arc::new(GatedTranslator::new());
        let cache = Arc::new(TranslationCache::new("en", Arc::clone(&translator) as _));

        let fetch = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(0, "es", "Boil water").await }
        });
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        translator.gate.notify_waiters();
        fetch.await.unwrap().unwrap();

        // Second lookup resolves synchronously from the cache
        let text = cache.get(0, "es", "Boil water").await.unwrap();
        assert_eq!(text, "[es] Boil water");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_clears_marker_and_allows_retry() {
        let translator = Arc::new(GatedTranslator::new());
        translator.fail_next.store(true, Ordering::SeqCst);
        let cache = Arc::new(TranslationCache::new("en", Arc::clone(&translator) as _));

        let failing = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(1, "hi", "Knead the dough").await }
        });
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        translator.gate.notify_waiters();
        assert!(failing.await.unwrap().is_err());

        // Retry issues a fresh fetch; the error was not cached
        let retry = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(1, "hi", "Knead the dough").await }
        });
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        translator.gate.notify_waiters();
        assert_eq!(retry.await.unwrap().unwrap(), "[hi] Knead the dough");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_reaches_attached_waiters() {
        let translator = Arc::new(GatedTranslator::new());
        translator.fail_next.store(true, Ordering::SeqCst);
        let cache = Arc::new(TranslationCache::new("en", Arc::clone(&translator) as _));

        let first = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(3, "fr", "Rest the batter").await }
        });
        let second = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get(3, "fr", "Rest the batter").await }
        });
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        translator.gate.notify_waiters();

        assert!(first.await.unwrap().is_err());
        assert!(second.await.unwrap().is_err());
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }
}
