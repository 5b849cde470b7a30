//! Application configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::models::turn::Language;
use crate::{AppError, Result};

/// Reasoning-model connection settings.
///
/// The API key is loaded at runtime from the environment, not from the TOML
/// config file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// Base URL of the OpenAI-compatible chat-completions endpoint.
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub name: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Bearer token for the endpoint (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
}

fn default_model_endpoint() -> String {
    "https://api.openai.com/v1".into()
}

fn default_temperature() -> f64 {
    1.0
}

/// Speech synthesis settings.
///
/// When `endpoint` is empty the synthesizer is disabled and every turn
/// carries an empty audio payload.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SpeechConfig {
    /// Base URL of the external speech renderer; empty disables synthesis.
    #[serde(default)]
    pub endpoint: String,
    /// Voice used for English output.
    #[serde(default = "default_voice_en")]
    pub voice_en: String,
    /// Voice used for Spanish output.
    #[serde(default = "default_voice_es")]
    pub voice_es: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            voice_en: default_voice_en(),
            voice_es: default_voice_es(),
        }
    }
}

fn default_voice_en() -> String {
    "am_adam".into()
}

fn default_voice_es() -> String {
    "em_alex".into()
}

fn default_true() -> bool {
    true
}

fn default_http_port() -> u16 {
    8000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("memory/conversations.db")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_language() -> Language {
    Language::En
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5501".into()]
}

fn default_software_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

/// Application configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Reasoning-model connection settings.
    pub model: ModelConfig,
    /// Speech synthesis settings.
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Default conversation language for new sessions.
    #[serde(default = "default_language")]
    pub language: Language,
    /// Whether reasoning think-blocks are kept in display output.
    #[serde(default)]
    pub verbose_llm: bool,
    /// Whether per-turn metrics files are written.
    #[serde(default = "default_true")]
    pub logging: bool,
    /// HTTP port for the turn API.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Path of the `SQLite` checkpoint database.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Directory for metrics files and the step-graph diagram.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Origins allowed by the CORS layer.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Version string reported by the config probe endpoint.
    #[serde(default = "default_software_version")]
    pub software_version: String,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the model API key from the `OPENAI_API_KEY` environment variable.
    ///
    /// A missing key is tolerated when the endpoint is a local server that
    /// does not authenticate; a warning is emitted instead.
    pub fn load_credentials(&mut self) {
        match env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => self.model.api_key = key,
            _ => warn!("OPENAI_API_KEY not set; requests are sent unauthenticated"),
        }
    }

    /// Path of the `SQLite` checkpoint database.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(AppError::Config("model.name must not be empty".into()));
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(AppError::Config(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("db_path must not be empty".into()));
        }

        Ok(())
    }
}
