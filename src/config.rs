//! Configuration management for cookmode
//!
//! Settings come from `cookmode.toml` in the XDG config directory, with
//! `COOKMODE_*` environment variables taking priority over the file and
//! built-in defaults filling the rest.

use std::path::PathBuf;

use url::Url;

use crate::{Error, Result};

/// Default recipe backend address
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8010";

/// Roughly conversational pacing for the console synthesizer
const DEFAULT_SPEECH_PACE_MS: u64 = 60;

/// Cooking session configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Recipe/translation backend base URL
    pub backend_url: String,

    /// Language recipe steps are written in
    pub source_language: String,

    /// Languages offered for display
    pub languages: Vec<String>,

    /// Enable voice input
    pub voice_enabled: bool,

    /// Console synthesizer pacing, milliseconds per character
    pub speech_pace_ms: u64,
}

/// On-disk configuration file shape; every field optional
#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    backend_url: Option<String>,
    source_language: Option<String>,
    languages: Option<Vec<String>>,
    voice: Option<bool>,
    speech_pace_ms: Option<u64>,
}

/// Path of `cookmode.toml`, if a config directory exists
fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "cookmode", "cookmode")
        .map(|dirs| dirs.config_dir().join("cookmode.toml"))
}

impl Config {
    /// Load configuration
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed, or if
    /// the resolved backend URL is invalid.
    pub fn load(disable_voice: bool) -> Result<Self> {
        let file = Self::load_file()?;

        let backend_url = std::env::var("COOKMODE_BACKEND_URL")
            .ok()
            .or(file.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Url::parse(&backend_url)
            .map_err(|e| Error::Config(format!("invalid backend URL {backend_url}: {e}")))?;

        let source_language = std::env::var("COOKMODE_SOURCE_LANG")
            .ok()
            .or(file.source_language)
            .unwrap_or_else(|| "en".to_string());

        let languages = std::env::var("COOKMODE_LANGUAGES")
            .ok()
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
            .or(file.languages)
            .unwrap_or_else(|| {
                ["en", "hi", "es", "fr"].map(String::from).to_vec()
            });

        let env_disable = std::env::var("COOKMODE_DISABLE_VOICE")
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        let voice_enabled = !disable_voice && !env_disable && file.voice.unwrap_or(true);

        if disable_voice {
            tracing::info!("voice explicitly disabled via --disable-voice");
        }

        let speech_pace_ms = file.speech_pace_ms.unwrap_or(DEFAULT_SPEECH_PACE_MS);

        Ok(Self {
            backend_url,
            source_language,
            languages,
            voice_enabled,
            speech_pace_ms,
        })
    }

    /// Read `cookmode.toml` if present
    fn load_file() -> Result<ConfigFile> {
        let Some(path) = config_file_path() else {
            return Ok(ConfigFile::default());
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => {
                tracing::debug!(path = %path.display(), "loaded config file");
                Ok(toml::from_str(&raw)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_parses_partial_settings() {
        let file: ConfigFile = toml::from_str(
            r#"
            backend_url = "http://kitchen.local:8010"
            languages = ["en", "fr"]
            "#,
        )
        .unwrap();
        assert_eq!(file.backend_url.as_deref(), Some("http://kitchen.local:8010"));
        assert_eq!(file.languages.as_deref(), Some(&["en".to_string(), "fr".to_string()][..]));
        assert!(file.voice.is_none());
    }

    #[test]
    fn empty_config_file_is_valid() {
        let file: ConfigFile = toml::from_str("").unwrap();
        assert!(file.backend_url.is_none());
    }
}
