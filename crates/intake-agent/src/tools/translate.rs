//! Translation capability.
//!
//! Errors come back as `Error:`-prefixed strings, not structured failures;
//! the engine pattern-matches on the prefix.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use intake_core::config::TranslationConfig;

const AUTO_DETECT: &str = "auto";

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translated_text: String,
}

/// Translates text between languages via an external service.
pub struct TranslateTool {
    client: reqwest::Client,
    config: TranslationConfig,
}

impl TranslateTool {
    pub fn new(config: TranslationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }

    /// Translate `text` into `target_language`. A missing or `"auto"` source
    /// language asks the service to detect it.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> String {
        if text.trim().is_empty() {
            return "Error: Text to translate is required and cannot be empty.".to_string();
        }
        if target_language.trim().is_empty() {
            return "Error: Target language code is required (e.g., 'en', 'es', 'fr')."
                .to_string();
        }
        if self.config.base_url.is_empty() {
            return "Error: translation service is not configured.".to_string();
        }
        let target = target_language.trim().to_lowercase();
        let source = source_language
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| AUTO_DETECT.to_string());
        debug!(source, target, chars = text.len(), "translating text");

        let url = format!("{}/translate", self.config.base_url.trim_end_matches('/'));
        let body = json!({
            "text": text,
            "source_language": source,
            "target_language": target,
        });
        let resp = match self.client.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => return format!("Error translating text: {}", e),
        };
        if !resp.status().is_success() {
            return format!("Error translating text: service returned {}", resp.status());
        }
        let parsed: TranslateResponse = match resp.json().await {
            Ok(parsed) => parsed,
            Err(e) => return format!("Error translating text: {}", e),
        };
        if parsed.translated_text.is_empty() {
            return "Error: Translation service returned empty result.".to_string();
        }
        parsed.translated_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let tool = TranslateTool::new(TranslationConfig::default());
        let out = tool.translate("   ", "en", None).await;
        assert_eq!(
            out,
            "Error: Text to translate is required and cannot be empty."
        );
    }

    #[tokio::test]
    async fn test_missing_target_language_rejected() {
        let tool = TranslateTool::new(TranslationConfig::default());
        let out = tool.translate("hola", "", Some("es")).await;
        assert!(out.contains("Target language code is required"));
    }

    #[tokio::test]
    async fn test_unconfigured_service_reported() {
        let tool = TranslateTool::new(TranslationConfig::default());
        let out = tool.translate("hola", "en", None).await;
        assert_eq!(out, "Error: translation service is not configured.");
    }
}
