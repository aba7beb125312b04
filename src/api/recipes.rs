//! Recipe lookup
//!
//! A failed lookup is terminal for the session; there is nothing to display.

use url::Url;

use crate::{Error, Result};

/// A recipe as served by the backend
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Recipe {
    /// Display name
    pub name: String,
    /// Ordered instruction steps
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Fetches recipes from the backend
pub struct RecipeClient {
    client: reqwest::Client,
    base_url: Url,
}

impl RecipeClient {
    /// Create a client against `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid backend URL {base_url}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// Fetch one recipe by identifier
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecipeLoad`] on any transport, status, or decode
    /// failure.
    pub async fn fetch(&self, recipe_id: &str) -> Result<Recipe> {
        let url = self
            .base_url
            .join(&format!("recipe/{recipe_id}"))
            .map_err(|e| Error::RecipeLoad(e.to_string()))?;
        tracing::debug!(%url, "fetching recipe");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::RecipeLoad(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RecipeLoad(format!("backend returned {status}: {body}")));
        }

        let recipe: Recipe = response
            .json()
            .await
            .map_err(|e| Error::RecipeLoad(e.to_string()))?;

        tracing::info!(name = %recipe.name, steps = recipe.instructions.len(), "recipe loaded");
        Ok(recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_decodes_with_missing_instructions() {
        let recipe: Recipe = serde_json::from_str(r#"{"name": "Poha"}"#).unwrap();
        assert_eq!(recipe.name, "Poha");
        assert!(recipe.instructions.is_empty());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(RecipeClient::new("not a url").is_err());
        assert!(RecipeClient::new("http://127.0.0.1:8010/").is_ok());
    }
}
