//! Speech-synthesis boundary.
//!
//! The session invokes the synthesizer after a turn completes; any failure
//! here is logged by the caller and never affects the returned turn result.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::config::SpeechConfig;
use crate::models::turn::Language;
use crate::{AppError, Result};

/// Renders text to an encoded audio payload.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Render `text` to a base64-encoded WAV payload. Empty input yields an
    /// empty payload.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Speech` on renderer failure.
    async fn synthesize(&self, text: &str, language: Language) -> Result<String>;
}

/// No-op synthesizer used when no renderer endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSpeech;

#[async_trait]
impl SpeechSynthesizer for DisabledSpeech {
    async fn synthesize(&self, _text: &str, _language: Language) -> Result<String> {
        Ok(String::new())
    }
}

/// HTTP-backed synthesizer: posts text to an external renderer and encodes
/// the returned WAV bytes.
pub struct HttpSpeech {
    client: reqwest::Client,
    endpoint: String,
    voice_en: String,
    voice_es: String,
}

impl HttpSpeech {
    /// Build a synthesizer from the speech configuration.
    #[must_use]
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            voice_en: config.voice_en.clone(),
            voice_es: config.voice_es.clone(),
        }
    }

    fn voice(&self, language: Language) -> &str {
        match language {
            Language::En => &self.voice_en,
            Language::Es => &self.voice_es,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeech {
    async fn synthesize(&self, text: &str, language: Language) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let response = self
            .client
            .post(format!("{}/synthesize", self.endpoint))
            .json(&serde_json::json!({
                "text": text,
                "voice": self.voice(language),
                "speed": 0.9,
            }))
            .send()
            .await
            .map_err(|err| AppError::Speech(format!("request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(AppError::Speech(format!(
                "renderer returned {}",
                response.status()
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|err| AppError::Speech(format!("failed to read audio body: {err}")))?;

        Ok(BASE64.encode(audio))
    }
}
