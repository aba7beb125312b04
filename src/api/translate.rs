//! Translation collaborator
//!
//! The session only sees the [`Translator`] trait; the HTTP implementation
//! talks to the backend's `/translate` endpoint. Failures are recoverable
//! and surface as [`Error::Translation`].

use async_trait::async_trait;
use url::Url;

use crate::{Error, Result};

/// External translation service
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Translation`] if the collaborator call fails.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

#[derive(Debug, serde::Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    target_lang: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

/// Backend-based translator
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTranslator {
    /// Create a translator against `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let endpoint = Url::parse(base_url)
            .and_then(|u| u.join("translate"))
            .map_err(|e| Error::Config(format!("invalid backend URL {base_url}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        tracing::debug!(target_language, chars = text.len(), "requesting translation");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&TranslateRequest {
                text,
                target_lang: target_language,
            })
            .send()
            .await
            .map_err(|e| Error::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Translation(format!(
                "backend returned {status}: {body}"
            )));
        }

        let result: TranslateResponse = response
            .json()
            .await
            .map_err(|e| Error::Translation(e.to_string()))?;
        Ok(result.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape_matches_backend() {
        let request = TranslateRequest {
            text: "Boil for 5 min",
            target_lang: "hi",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "Boil for 5 min");
        assert_eq!(json["target_lang"], "hi");
    }

    #[test]
    fn response_wire_shape_matches_backend() {
        let response: TranslateResponse =
            serde_json::from_str(r#"{"translated_text": "5 मिनट उबालें"}"#).unwrap();
        assert_eq!(response.translated_text, "5 मिनट उबालें");
    }
}
