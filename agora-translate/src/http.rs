//! HTTP translation provider.
//!
//! Speaks the LibreTranslate JSON API:
//!
//! ```text
//! POST {endpoint}/translate
//! { "q": "...", "source": "auto", "target": "en", "format": "text", "api_key": "..." }
//! → { "translatedText": "...", "detectedLanguage": { "language": "es", "confidence": 92.0 } }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use agora_core::error::{AgoraError, Result};
use agora_core::traits::Translator;
use agora_core::types::{Translation, TranslationRequest};

/// HTTP translator configuration.
///
/// The API key is never serialized and shows as `[REDACTED]` in `Debug`.
#[derive(Clone, Serialize, Deserialize)]
pub struct HttpTranslatorConfig {
    /// Base URL of the translation API (e.g. "http://localhost:5000")
    pub endpoint: String,
    /// API key, when the server requires one
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl fmt::Debug for HttpTranslatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTranslatorConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

const DEFAULT_TRANSLATOR_URL: &str = "http://localhost:5000";

impl Default for HttpTranslatorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSLATOR_URL)
    }
}

impl HttpTranslatorConfig {
    /// Creates config for the given base URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout_seconds: 10,
        }
    }

    /// Adds an API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

#[derive(Serialize)]
struct TranslateBody<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateReply {
    translated_text: String,
    #[serde(default)]
    detected_language: Option<DetectedLanguage>,
}

#[derive(Deserialize)]
struct DetectedLanguage {
    language: String,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: String,
}

/// Client for a LibreTranslate-compatible translation server.
pub struct HttpTranslator {
    config: HttpTranslatorConfig,
    translate_url: Url,
    http_client: reqwest::Client,
}

impl HttpTranslator {
    /// Creates a translator, validating the endpoint URL.
    pub fn with_config(config: HttpTranslatorConfig) -> Result<Self> {
        let base = Url::parse(config.endpoint.trim())
            .map_err(|e| AgoraError::ConfigError(format!("invalid translator URL '{}': {}", config.endpoint, e)))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(AgoraError::ConfigError(format!(
                "translator URL must be http or https, got '{}'",
                base.scheme()
            )));
        }

        let translate_url = Url::parse(&format!("{}/translate", base.as_str().trim_end_matches('/')))
            .map_err(|e| AgoraError::ConfigError(e.to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AgoraError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            translate_url,
            http_client,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HttpTranslatorConfig {
        &self.config
    }

    fn transport_error(err: reqwest::Error) -> AgoraError {
        if err.is_timeout() {
            AgoraError::ConnectionTimeout(err.to_string())
        } else {
            AgoraError::HttpError(err.to_string())
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    #[instrument(skip(self, request), fields(source = %request.source, target = %request.target, bytes = request.text.len()))]
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        let body = TranslateBody {
            q: &request.text,
            source: request.source.as_str(),
            target: request.target.as_str(),
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        let response = self
            .http_client
            .post(self.translate_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorReply>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            let message = format!("HTTP {}: {}", status, reason);
            warn!(%status, "Translation provider returned an error");

            return Err(if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                AgoraError::ProviderUnavailable(message)
            } else {
                AgoraError::TranslationFailed(message)
            });
        }

        let reply: TranslateReply = response
            .json()
            .await
            .map_err(|e| AgoraError::TranslationFailed(format!("invalid provider response: {}", e)))?;

        let detected_source = reply.detected_language.map(|d| d.language);
        debug!(detected = ?detected_source, "Translated via provider");

        Ok(Translation {
            text: reply.translated_text,
            source: request.source.clone(),
            target: request.target.clone(),
            detected_source,
            cached: false,
            provider: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
